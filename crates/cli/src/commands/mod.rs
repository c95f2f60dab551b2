//! Command handlers for the NSS Search CLI.

pub mod ask;
pub mod retrieve;
pub mod serve;
pub mod stats;

pub use ask::AskCommand;
pub use retrieve::RetrieveCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;
