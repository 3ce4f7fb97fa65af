//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.inertia.version, None);
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.session.cookie_name, "inertia_session");
        assert_eq!(config.session.idle_timeout_secs, 7200);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            [inertia]
            version = "2024.06.01"

            [listener]
            bind_address = "0.0.0.0:8080"

            [session]
            cookie_name = "app_session"
            idle_timeout_secs = 900

            [observability]
            log_level = "debug"
            metrics_enabled = true
            metrics_address = "0.0.0.0:9100"
            "#,
        )
        .unwrap();

        assert_eq!(config.inertia.version.as_deref(), Some("2024.06.01"));
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.session.cookie_name, "app_session");
        assert_eq!(config.session.idle_timeout_secs, 900);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_rejects_empty_version() {
        let err = parse_config("[inertia]\nversion = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &[ValidationError::EmptyVersion]));
        assert!(err.to_string().starts_with("Validation failed: inertia.version"));
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(matches!(parse_config("[inertia"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
