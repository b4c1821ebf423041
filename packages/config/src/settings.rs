// ABOUTME: Tagging behaviour settings loaded from the environment
// ABOUTME: Maximum tag length and forced lowercasing of tag names

use std::env;
use thiserror::Error;
use tracing::debug;

use crate::constants::{TAGGING_FORCE_LOWERCASE_TAGS, TAGGING_MAX_TAG_LENGTH};

/// Default maximum length of a single tag name, in characters
pub const DEFAULT_MAX_TAG_LENGTH: usize = 50;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggingSettings {
    /// Longest tag name accepted by the tag form fields
    pub max_tag_length: usize,
    /// Lowercase tag names before they are stored
    pub force_lowercase_tags: bool,
}

impl Default for TaggingSettings {
    fn default() -> Self {
        Self {
            max_tag_length: DEFAULT_MAX_TAG_LENGTH,
            force_lowercase_tags: false,
        }
    }
}

impl TaggingSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_tag_length = match env::var(TAGGING_MAX_TAG_LENGTH) {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: TAGGING_MAX_TAG_LENGTH,
                        value: raw.clone(),
                    })?;
                if parsed == 0 {
                    return Err(ConfigError::MustBePositive(TAGGING_MAX_TAG_LENGTH));
                }
                parsed
            }
            Err(_) => defaults.max_tag_length,
        };

        let force_lowercase_tags = match env::var(TAGGING_FORCE_LOWERCASE_TAGS) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                name: TAGGING_FORCE_LOWERCASE_TAGS,
                value: raw.clone(),
            })?,
            Err(_) => defaults.force_lowercase_tags,
        };

        debug!(
            "Tagging settings: max_tag_length={}, force_lowercase_tags={}",
            max_tag_length, force_lowercase_tags
        );

        Ok(Self {
            max_tag_length,
            force_lowercase_tags,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(TAGGING_MAX_TAG_LENGTH);
        env::remove_var(TAGGING_FORCE_LOWERCASE_TAGS);
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        let settings = TaggingSettings::from_env().unwrap();
        assert_eq!(settings, TaggingSettings::default());
        assert_eq!(settings.max_tag_length, 50);
        assert!(!settings.force_lowercase_tags);
    }

    #[test]
    #[serial]
    fn test_reads_values() {
        clear_env();
        env::set_var(TAGGING_MAX_TAG_LENGTH, "12");
        env::set_var(TAGGING_FORCE_LOWERCASE_TAGS, "yes");

        let settings = TaggingSettings::from_env().unwrap();
        assert_eq!(settings.max_tag_length, 12);
        assert!(settings.force_lowercase_tags);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_garbage() {
        clear_env();
        env::set_var(TAGGING_MAX_TAG_LENGTH, "lots");
        assert!(matches!(
            TaggingSettings::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        env::set_var(TAGGING_MAX_TAG_LENGTH, "0");
        assert_eq!(
            TaggingSettings::from_env(),
            Err(ConfigError::MustBePositive(TAGGING_MAX_TAG_LENGTH))
        );

        clear_env();
        env::set_var(TAGGING_FORCE_LOWERCASE_TAGS, "maybe");
        assert!(TaggingSettings::from_env().is_err());

        clear_env();
    }
}
