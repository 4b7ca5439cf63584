//! Configuration file loader.
//!
//! Loads `ManagerConfig` from a `procman.toml` file. A missing file is
//! not an error: the manager runs with defaults in that case.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::ManagerConfig;
use std::path::Path;

/// Loads manager configuration from the given file path.
///
/// # Arguments
///
/// * `path` - Path to a `procman.toml` file
///
/// # Returns
///
/// The parsed `ManagerConfig`, or the default configuration if the file
/// does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file has invalid TOML syntax
/// - A setting has an invalid value (e.g. a zero event capacity)
pub fn load_config(path: &Path) -> ConfigResult<ManagerConfig> {
    if !path.exists() {
        return Ok(ManagerConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ManagerConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&config, path)?;

    Ok(config)
}

fn validate(config: &ManagerConfig, path: &Path) -> ConfigResult<()> {
    if config.event_capacity == 0 {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "event_capacity must be greater than zero".to_string(),
        });
    }

    if config.instance_root.is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "instance_root must not be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_missing_file_returns_default() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procman.toml");

        let config = load_config(&path).expect("Should handle missing file");

        assert_eq!(config.instance_root, ManagerConfig::default().instance_root);
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_load_config_full_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procman.toml");

        fs::write(
            &path,
            "instance_root = \"/srv/jobs\"\nevent_capacity = 64\n",
        )
        .expect("Failed to write config file");

        let config = load_config(&path).expect("Failed to load config");

        assert_eq!(config.instance_root, "/srv/jobs");
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procman.toml");

        fs::write(&path, "instance_root = [invalid toml").expect("Failed to write config file");

        let result = load_config(&path);
        assert!(result.is_err(), "Should fail on invalid TOML");

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("procman.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[test]
    fn test_load_config_zero_event_capacity() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procman.toml");

        fs::write(&path, "event_capacity = 0").expect("Failed to write config file");

        let result = load_config(&path);
        assert!(result.is_err(), "Should reject zero event capacity");

        if let Err(ConfigError::InvalidConfig { reason, .. }) = result {
            assert!(reason.contains("event_capacity"));
        } else {
            panic!("Expected InvalidConfig error");
        }
    }

    #[test]
    fn test_load_config_empty_instance_root() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procman.toml");

        fs::write(&path, "instance_root = \"\"").expect("Failed to write config file");

        let result = load_config(&path);
        assert!(result.is_err(), "Should reject empty instance root");
    }
}
