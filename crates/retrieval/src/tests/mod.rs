//! Pipeline-level tests.

mod support;
mod upstream_failures;
