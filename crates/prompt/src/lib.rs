//! Prompt system for NSS Search.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, with builtins compiled into the binary
//! - Workspace overrides under `.nss/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt, ANSWER_PROMPT_ID, INTENT_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
