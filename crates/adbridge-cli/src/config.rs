//! Configuration loading for the Adbridge CLI
//!
//! Config file location: `--config <path>`, otherwise ~/.adbridge/config.toml
//! when present. `ADBRIDGE_*` environment variables override file values.
//!
//! Example config:
//! ```toml
//! [ldap]
//! server_url = "ldaps://dc1.corp.com:636"
//! bind_dn = "CN=svc-adbridge,CN=Users,DC=corp,DC=com"
//! bind_password = "secret"
//!
//! [directory]
//! domain = "corp.com"
//! base_dn = "DC=corp,DC=com"
//! ```

use adbridge_core::AdbridgeConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Get config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .context("Could not determine home directory")?
        .home_dir()
        .to_path_buf();

    Ok(home.join(".adbridge"))
}

/// Get default config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from file and environment
pub fn load(explicit: Option<&str>) -> Result<AdbridgeConfig> {
    let path = match explicit {
        Some(path) => Some(PathBuf::from(path)),
        None => config_path().ok().filter(|p| p.exists()),
    };

    let mut config = match path {
        Some(path) => read(&path)?,
        None => AdbridgeConfig::default(),
    };
    config.apply_env();

    config
        .validate()
        .context("Invalid configuration. Set ADBRIDGE_* variables or pass --config")?;

    Ok(config)
}

fn read(path: &Path) -> Result<AdbridgeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    AdbridgeConfig::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        if let Ok(path) = config_path() {
            assert!(path.ends_with(".adbridge/config.toml"));
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load(Some("/nonexistent/adbridge.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = AdbridgeConfig::default();
        config.directory.domain = "corp.com".to_string();

        let text = toml::to_string(&config).unwrap();
        let parsed = AdbridgeConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.directory.domain, "corp.com");
    }
}
