//! Configuration for Adbridge

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdbridgeConfig {
    #[serde(default)]
    pub ldap: LdapConfigSection,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub password: PasswordPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AdbridgeConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;

        tracing::debug!("Loaded configuration from {}", path);
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override settings from `ADBRIDGE_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ADBRIDGE_LDAP_URL") {
            self.ldap.server_url = url;
        }
        if let Ok(dn) = std::env::var("ADBRIDGE_BIND_DN") {
            self.ldap.bind_dn = dn;
        }
        if let Ok(password) = std::env::var("ADBRIDGE_BIND_PASSWORD") {
            self.ldap.bind_password = password;
        }
        if std::env::var("ADBRIDGE_START_TLS").map(|v| v == "true").unwrap_or(false) {
            self.ldap.start_tls = true;
        }
        if let Ok(timeout) = std::env::var("ADBRIDGE_TIMEOUT_SECONDS") {
            if let Ok(t) = timeout.parse() {
                self.ldap.timeout_seconds = t;
            }
        }
        if let Ok(domain) = std::env::var("ADBRIDGE_DOMAIN") {
            self.directory.domain = domain;
        }
        if let Ok(base_dn) = std::env::var("ADBRIDGE_BASE_DN") {
            self.directory.base_dn = base_dn;
        }
        if let Ok(level) = std::env::var("ADBRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.ldap.validate()?;
        self.directory.validate()?;
        self.password.validate()
    }
}

/// LDAP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfigSection {
    /// LDAP server URL (ldap:// or ldaps://)
    #[serde(default = "default_ldap_url")]
    pub server_url: String,

    /// Use STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Service account used for searches and writes
    #[serde(default)]
    pub bind_dn: String,

    /// Service account password
    #[serde(default)]
    pub bind_password: String,

    /// Connection timeout in seconds
    #[serde(default = "default_ldap_timeout")]
    pub timeout_seconds: u64,
}

fn default_ldap_url() -> String {
    "ldap://localhost:389".to_string()
}

fn default_ldap_timeout() -> u64 {
    10
}

impl Default for LdapConfigSection {
    fn default() -> Self {
        Self {
            server_url: default_ldap_url(),
            start_tls: false,
            skip_tls_verify: false,
            bind_dn: String::new(),
            bind_password: String::new(),
            timeout_seconds: default_ldap_timeout(),
        }
    }
}

impl LdapConfigSection {
    pub fn validate(&self) -> crate::Result<()> {
        if self.server_url.is_empty() {
            return Err(crate::Error::Config("Server URL is required".into()));
        }
        if !self.server_url.starts_with("ldap://") && !self.server_url.starts_with("ldaps://") {
            return Err(crate::Error::Config(
                "Server URL must start with ldap:// or ldaps://".into(),
            ));
        }
        if self.bind_dn.is_empty() {
            return Err(crate::Error::Config("Bind DN is required".into()));
        }
        Ok(())
    }
}

/// Directory tree settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Domain appended to account names to build principal names
    /// Example: "corp.com"
    #[serde(default)]
    pub domain: String,

    /// Root of the directory tree
    /// Example: "DC=corp,DC=com"
    #[serde(default)]
    pub base_dn: String,

    /// Location used when a new user is created without one
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Object classes written on user creation
    #[serde(default = "default_user_object_classes")]
    pub user_object_classes: Vec<String>,
}

fn default_location() -> String {
    crate::DEFAULT_LOCATION.to_string()
}

fn default_user_object_classes() -> Vec<String> {
    ["top", "person", "organizationalPerson", "user"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            base_dn: String::new(),
            default_location: default_location(),
            user_object_classes: default_user_object_classes(),
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.domain.is_empty() {
            return Err(crate::Error::Config("Domain is required".into()));
        }
        if self.base_dn.is_empty() {
            return Err(crate::Error::Config("Base DN is required".into()));
        }
        if self.user_object_classes.is_empty() {
            return Err(crate::Error::Config(
                "At least one user object class is required".into(),
            ));
        }
        Ok(())
    }

    /// Principal name (`user@domain`) for an account name
    pub fn principal(&self, user_name: &str) -> String {
        if user_name.contains('@') {
            user_name.to_string()
        } else {
            format!("{}@{}", user_name, self.domain)
        }
    }
}

/// Symbol pools used for generated passwords
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    #[serde(default = "default_specials")]
    pub specials: String,

    #[serde(default = "default_digits")]
    pub digits: String,

    #[serde(default = "default_uppercase")]
    pub uppercase: String,

    #[serde(default = "default_lowercase")]
    pub lowercase: String,
}

fn default_specials() -> String {
    "!@#$%^&*".to_string()
}

fn default_digits() -> String {
    "0123456789".to_string()
}

fn default_uppercase() -> String {
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string()
}

fn default_lowercase() -> String {
    "abcdefghijklmnopqrstuvwxyz".to_string()
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            specials: default_specials(),
            digits: default_digits(),
            uppercase: default_uppercase(),
            lowercase: default_lowercase(),
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self) -> crate::Result<()> {
        for (name, pool) in [
            ("specials", &self.specials),
            ("digits", &self.digits),
            ("uppercase", &self.uppercase),
            ("lowercase", &self.lowercase),
        ] {
            if pool.is_empty() {
                return Err(crate::Error::Config(format!(
                    "Password pool '{}' must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config = AdbridgeConfig::from_toml(
            r#"
            [ldap]
            server_url = "ldaps://dc1.corp.com:636"
            bind_dn = "CN=svc,CN=Users,DC=corp,DC=com"
            bind_password = "secret"

            [directory]
            domain = "corp.com"
            base_dn = "DC=corp,DC=com"
            "#,
        )
        .unwrap();

        assert_eq!(config.directory.domain, "corp.com");
        assert_eq!(config.directory.default_location, "CN=Users,");
        assert_eq!(config.directory.user_object_classes.len(), 4);
        assert_eq!(config.ldap.timeout_seconds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = AdbridgeConfig::default();
        assert!(config.validate().is_err());

        config.ldap.bind_dn = "CN=svc,DC=corp,DC=com".into();
        config.directory.domain = "corp.com".into();
        config.directory.base_dn = "DC=corp,DC=com".into();
        assert!(config.validate().is_ok());

        config.password.digits.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_principal() {
        let directory = DirectoryConfig {
            domain: "corp.com".into(),
            ..Default::default()
        };
        assert_eq!(directory.principal("jdoe"), "jdoe@corp.com");
        assert_eq!(directory.principal("jdoe@other.org"), "jdoe@other.org");
    }
}
