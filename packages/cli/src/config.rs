use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

use tagging_config::constants::{
    PORT, TAGGING_API_HOST, TAGGING_API_PORT, TAGGING_CORS_ORIGIN, TAGGING_DATABASE_PATH,
    TAGGING_LIST_MODELS, TAGGING_PAGINATE_BY,
};
use tagging_config::TaggingSettings;

pub const DEFAULT_PORT: u16 = 4010;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid list model name: {0}")]
    InvalidListModel(String),
    #[error("List model {0} is given more than once")]
    DuplicateListModel(String),
    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),
    #[error(transparent)]
    Settings(#[from] tagging_config::ConfigError),
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub host: IpAddr,
    pub cors_origin: String,
    /// `None` means the default database under `~/.tagging`
    pub database_path: Option<PathBuf>,
    /// Content types that get a tagged-object list view
    pub list_models: Vec<String>,
    pub paginate_by: Option<i64>,
    pub settings: TaggingSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var(TAGGING_API_PORT)
            .or_else(|_| env::var(PORT))
            .unwrap_or_else(|_| DEFAULT_PORT.to_string());

        let port = port_str.trim().parse::<u16>()?;

        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host_str = env::var(TAGGING_API_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let host = host_str
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_str.clone()))?;

        let cors_origin =
            env::var(TAGGING_CORS_ORIGIN).unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        let database_path = env::var(TAGGING_DATABASE_PATH)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let list_models = parse_list_models(&env::var(TAGGING_LIST_MODELS).unwrap_or_default())?;

        let paginate_by = match env::var(TAGGING_PAGINATE_BY) {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(size) if size > 0 => Some(size),
                _ => return Err(ConfigError::InvalidPageSize(raw)),
            },
            Err(_) => None,
        };

        Ok(Config {
            port,
            host,
            cors_origin,
            database_path,
            list_models,
            paginate_by,
            settings: TaggingSettings::from_env()?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Content types become URL path segments, so only plain identifier
/// characters are accepted and each may appear once
fn parse_list_models(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut models: Vec<String> = Vec::new();

    for model in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let valid = model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(ConfigError::InvalidListModel(model.to_string()));
        }
        if models.iter().any(|existing| existing == model) {
            return Err(ConfigError::DuplicateListModel(model.to_string()));
        }
        models.push(model.to_string());
    }

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        PORT,
        TAGGING_API_PORT,
        TAGGING_API_HOST,
        TAGGING_CORS_ORIGIN,
        TAGGING_DATABASE_PATH,
        TAGGING_LIST_MODELS,
        TAGGING_PAGINATE_BY,
        "TAGGING_MAX_TAG_LENGTH",
        "TAGGING_FORCE_LOWERCASE_TAGS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 4010);
        assert_eq!(config.addr().to_string(), "127.0.0.1:4010");
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert!(config.database_path.is_none());
        assert!(config.list_models.is_empty());
        assert!(config.paginate_by.is_none());
        assert_eq!(config.settings, TaggingSettings::default());
    }

    #[test]
    #[serial]
    fn test_legacy_port_fallback() {
        clear_env();
        env::set_var(PORT, "8080");

        assert_eq!(Config::from_env().unwrap().port, 8080);

        env::set_var(TAGGING_API_PORT, "9000");
        assert_eq!(Config::from_env().unwrap().port, 9000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port() {
        clear_env();
        env::set_var(TAGGING_API_PORT, "not-a-number");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidPort(_))));

        env::set_var(TAGGING_API_PORT, "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::PortOutOfRange(0))
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_host() {
        clear_env();
        env::set_var(TAGGING_API_HOST, "localhost:80");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidHost(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_list_views_from_env() {
        clear_env();
        env::set_var(TAGGING_LIST_MODELS, "article, photo,,");
        env::set_var(TAGGING_PAGINATE_BY, "20");
        env::set_var(TAGGING_DATABASE_PATH, "/tmp/tags.db");

        let config = Config::from_env().unwrap();
        assert_eq!(config.list_models, vec!["article", "photo"]);
        assert_eq!(config.paginate_by, Some(20));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/tags.db")));

        env::set_var(TAGGING_PAGINATE_BY, "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidPageSize(_))
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_list_models_rejects_duplicates_and_route_syntax() {
        clear_env();

        env::set_var(TAGGING_LIST_MODELS, "article, article");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::DuplicateListModel(model)) if model == "article"
        ));

        for bad in ["{tag}", "art/icle", "*rest", "a b"] {
            env::set_var(TAGGING_LIST_MODELS, bad);
            assert!(
                matches!(Config::from_env(), Err(ConfigError::InvalidListModel(_))),
                "{} should be rejected",
                bad
            );
        }

        env::set_var(TAGGING_LIST_MODELS, "blog.article,photo_v2");
        assert_eq!(
            Config::from_env().unwrap().list_models,
            vec!["blog.article", "photo_v2"]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_tagging_settings_errors_propagate() {
        clear_env();
        env::set_var("TAGGING_MAX_TAG_LENGTH", "none");
        assert!(matches!(Config::from_env(), Err(ConfigError::Settings(_))));
        clear_env();
    }
}
