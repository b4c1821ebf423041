// ABOUTME: Core types and paths for the tagging service
// ABOUTME: Foundational package providing shared functionality across all tagging packages

pub mod constants;
pub mod validation;

// Re-export constants
pub use constants::{database_file, tagging_dir};

// Re-export validation
pub use validation::ValidationError;
