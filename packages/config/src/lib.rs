// ABOUTME: Configuration for the tagging service
// ABOUTME: Environment variable names and tagging behaviour settings

pub mod constants;
pub mod settings;

pub use settings::{ConfigError, TaggingSettings, DEFAULT_MAX_TAG_LENGTH};
