//! LDAP connection settings and filter construction

use adbridge_core::config::AdbridgeConfig;
use adbridge_core::utils::strip_domain;
use ldap3::ldap_escape;
use serde::{Deserialize, Serialize};

// ============================================================================
// LDAP Configuration
// ============================================================================

/// Settings for talking to the directory server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LdapConfig {
    /// LDAP server URL (ldap:// or ldaps://)
    /// Example: "ldaps://dc1.corp.com:636"
    pub server_url: String,

    /// Use STARTTLS for connection upgrade
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Service account used for searches and writes
    /// Example: "CN=svc-adbridge,CN=Users,DC=corp,DC=com"
    pub bind_dn: String,

    /// Service account password
    pub bind_password: String,

    /// Root of all searches
    /// Example: "DC=corp,DC=com"
    pub base_dn: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    10
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            server_url: "ldap://localhost:389".to_string(),
            start_tls: false,
            skip_tls_verify: false,
            bind_dn: String::new(),
            bind_password: String::new(),
            base_dn: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl From<&AdbridgeConfig> for LdapConfig {
    fn from(config: &AdbridgeConfig) -> Self {
        Self {
            server_url: config.ldap.server_url.clone(),
            start_tls: config.ldap.start_tls,
            skip_tls_verify: config.ldap.skip_tls_verify,
            bind_dn: config.ldap.bind_dn.clone(),
            bind_password: config.ldap.bind_password.clone(),
            base_dn: config.directory.base_dn.clone(),
            timeout_seconds: config.ldap.timeout_seconds,
        }
    }
}

impl LdapConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server_url.is_empty() {
            return Err("Server URL is required".to_string());
        }

        if !self.server_url.starts_with("ldap://") && !self.server_url.starts_with("ldaps://") {
            return Err("Server URL must start with ldap:// or ldaps://".to_string());
        }

        if self.bind_dn.is_empty() {
            return Err("Bind DN is required".to_string());
        }

        if self.base_dn.is_empty() {
            return Err("Base DN is required".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Filter matching an account by principal name or account name.
///
/// `user_name` may be bare or `user@domain`; the lookup key is the part
/// before `@`.
pub fn user_filter(user_name: &str, domain: &str) -> String {
    let key = strip_domain(user_name);
    format!(
        "(|(userPrincipalName={}@{})(sAMAccountName={}))",
        ldap_escape(key),
        ldap_escape(domain),
        ldap_escape(key)
    )
}

/// Filter for a principal as passed to `user_exists`.
pub fn principal_filter(principal: &str) -> String {
    format!(
        "(&(objectClass=user)(|(userPrincipalName={})(sAMAccountName={})))",
        ldap_escape(principal),
        ldap_escape(strip_domain(principal))
    )
}

/// Filter for a group by common name.
pub fn group_filter(group: &str) -> String {
    format!("(&(objectClass=group)(cn={}))", ldap_escape(group))
}

/// Whether a group reference is already a DN rather than a name.
pub fn looks_like_dn(value: &str) -> bool {
    value.contains('=') && value.contains(',')
}
