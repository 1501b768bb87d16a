//! LDAP client implementation
//!
//! Every operation opens its own connection, binds with the service account,
//! performs the request and unbinds. Supports LDAP, LDAPS (SSL) and STARTTLS.

use crate::directory::DirectoryClient;
use crate::dn::leaf_and_parent;
use crate::ldap::types::*;
use adbridge_core::types::{Modification, NewEntry, UserRecord};
use adbridge_core::{Error, Result};
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// LDAP result codes the facade distinguishes
mod rc {
    pub const SUCCESS: u32 = 0;
    pub const NO_SUCH_OBJECT: u32 = 32;
    pub const INVALID_CREDENTIALS: u32 = 49;
    pub const UNWILLING_TO_PERFORM: u32 = 53;
    pub const ENTRY_ALREADY_EXISTS: u32 = 68;
}

/// `DirectoryClient` backed by an LDAP server
pub struct LdapDirectory {
    config: LdapConfig,
}

impl LdapDirectory {
    /// Create a new LDAP directory client
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// Create LDAP connection with proper TLS settings
    async fn create_connection(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.timeout_seconds))
            .set_starttls(self.config.start_tls)
            .set_no_tls_verify(self.config.skip_tls_verify);

        debug!("Connecting to LDAP server: {}", self.config.server_url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.config.server_url)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to LDAP server: {}", e)))?;

        ldap3::drive!(conn);
        Ok(ldap)
    }

    /// Connection bound with the service account
    async fn service_connection(&self) -> Result<Ldap> {
        let mut ldap = self.create_connection().await?;

        let result = ldap
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .map_err(|e| Error::Connection(format!("Service bind failed: {}", e)))?;

        if result.rc != rc::SUCCESS {
            return Err(Error::Config(format!(
                "Service account bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        Ok(ldap)
    }

    async fn search(
        &self,
        ldap: &mut Ldap,
        base: &str,
        scope: Scope,
        filter: &str,
        attrs: Vec<&str>,
    ) -> Result<Vec<SearchEntry>> {
        debug!("Searching {} with filter: {}", base, filter);

        let (rs, _res) = ldap
            .search(base, scope, filter, attrs)
            .await
            .map_err(|e| Error::Connection(format!("Search failed: {}", e)))?
            .success()
            .map_err(|e| Error::Connection(format!("Search error: {}", e)))?;

        Ok(rs.into_iter().map(SearchEntry::construct).collect())
    }

    /// All member DNs of a group, following ranged retrieval. `None` when
    /// the group does not exist.
    async fn member_dns(&self, ldap: &mut Ldap, group: &str) -> Result<Option<Vec<String>>> {
        let first = if looks_like_dn(group) {
            self.search(ldap, group, Scope::Base, "(objectClass=group)", vec!["member"])
                .await?
        } else {
            let filter = group_filter(group);
            self.search(ldap, &self.config.base_dn, Scope::Subtree, &filter, vec!["member"])
                .await?
        };

        let Some(mut entry) = first.into_iter().next() else {
            return Ok(None);
        };
        let group_dn = entry.dn.clone();
        let mut members = Vec::new();

        while let Some(next) = take_member_page(&mut entry.attrs, &mut members) {
            let attr = format!("member;range={}-*", next);
            debug!("Fetching {} of {}", attr, group_dn);

            let page = self
                .search(ldap, &group_dn, Scope::Base, "(objectClass=*)", vec![attr.as_str()])
                .await?;
            match page.into_iter().next() {
                Some(page) => entry = page,
                None => break,
            }
        }

        Ok(Some(members))
    }
}

/// Map a write result onto the error taxonomy
fn check_result(result: LdapResult, dn: &str) -> Result<()> {
    match result.rc {
        rc::SUCCESS => Ok(()),
        rc::NO_SUCH_OBJECT => Err(Error::NoSuchObject(dn.to_string())),
        rc::ENTRY_ALREADY_EXISTS => Err(Error::EntryAlreadyExists(dn.to_string())),
        code => Err(Error::Ldap {
            rc: code,
            message: result.text,
        }),
    }
}

fn to_record(entry: SearchEntry) -> UserRecord {
    UserRecord::from_entry(entry.dn, entry.attrs)
}

fn values_to_bytes<'a, I>(values: I) -> HashSet<Vec<u8>>
where
    I: IntoIterator<Item = &'a adbridge_core::types::AttrValue>,
{
    values.into_iter().map(|v| v.as_bytes().to_vec()).collect()
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn find(&self, filter: &str) -> Result<Vec<UserRecord>> {
        let mut ldap = self.service_connection().await?;
        let entries = self
            .search(&mut ldap, &self.config.base_dn, Scope::Subtree, filter, vec!["*"])
            .await;
        let _ = ldap.unbind().await;

        Ok(entries?.into_iter().map(to_record).collect())
    }

    async fn user_exists(&self, principal: &str) -> Result<bool> {
        let mut ldap = self.service_connection().await?;
        let filter = principal_filter(principal);
        let entries = self
            .search(&mut ldap, &self.config.base_dn, Scope::Subtree, &filter, vec!["dn"])
            .await;
        let _ = ldap.unbind().await;

        Ok(!entries?.is_empty())
    }

    async fn authenticate(&self, principal: &str, password: &str) -> Result<()> {
        // An empty password would be an unauthenticated bind, which succeeds.
        if password.is_empty() {
            return Err(Error::InvalidCredentials {
                detail: "Empty password".to_string(),
            });
        }

        let mut ldap = self.create_connection().await?;

        let result = ldap
            .simple_bind(principal, password)
            .await
            .map_err(|e| Error::Connection(format!("User bind failed: {}", e)))?;

        let _ = ldap.unbind().await;

        match result.rc {
            rc::SUCCESS => Ok(()),
            rc::INVALID_CREDENTIALS => {
                debug!("Bind rejected for {}: {}", principal, result.text);
                Err(Error::InvalidCredentials {
                    detail: result.text,
                })
            }
            rc::UNWILLING_TO_PERFORM => Err(Error::AccountDisabled {
                detail: result.text,
            }),
            code => Err(Error::Ldap {
                rc: code,
                message: result.text,
            }),
        }
    }

    async fn replace(&self, dn: &str, changes: &[Modification]) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mods: Vec<Mod<Vec<u8>>> = changes
            .iter()
            .map(|m| Mod::Replace(m.attribute.as_bytes().to_vec(), values_to_bytes(&m.values)))
            .collect();

        let mut ldap = self.service_connection().await?;
        debug!(dn = %dn, count = changes.len(), "Replacing attributes");

        let result = ldap
            .modify(dn, mods)
            .await
            .map_err(|e| Error::Connection(format!("Failed to update entry {}: {}", dn, e)));
        let _ = ldap.unbind().await;

        check_result(result?, dn)?;
        info!(dn = %dn, "LDAP entry updated");
        Ok(())
    }

    async fn rename(&self, dn: &str, new_dn: &str) -> Result<()> {
        let (rdn, parent) = leaf_and_parent(new_dn);
        if rdn.is_empty() {
            return Err(Error::InvalidArgument(format!("Invalid target DN: {}", new_dn)));
        }

        let mut ldap = self.service_connection().await?;
        debug!(dn = %dn, new_dn = %new_dn, "Renaming entry");

        let result = ldap
            .modifydn(dn, &rdn, true, parent.as_deref())
            .await
            .map_err(|e| Error::Connection(format!("Failed to rename entry {}: {}", dn, e)));
        let _ = ldap.unbind().await;

        check_result(result?, dn)?;
        info!(dn = %dn, new_dn = %new_dn, "LDAP entry renamed");
        Ok(())
    }

    async fn create(&self, dn: &str, entry: NewEntry) -> Result<()> {
        let attrs: Vec<(Vec<u8>, HashSet<Vec<u8>>)> = entry
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| (name.as_bytes().to_vec(), values_to_bytes(values)))
            .collect();

        let mut ldap = self.service_connection().await?;
        debug!(dn = %dn, "Creating LDAP entry");

        let result = ldap
            .add(dn, attrs)
            .await
            .map_err(|e| Error::Connection(format!("Failed to create entry {}: {}", dn, e)));
        let _ = ldap.unbind().await;

        check_result(result?, dn)?;
        info!(dn = %dn, "LDAP entry created");
        Ok(())
    }

    async fn delete(&self, dn: &str) -> Result<()> {
        let mut ldap = self.service_connection().await?;
        debug!(dn = %dn, "Deleting LDAP entry");

        let result = ldap
            .delete(dn)
            .await
            .map_err(|e| Error::Connection(format!("Failed to delete entry {}: {}", dn, e)));
        let _ = ldap.unbind().await;

        check_result(result?, dn)?;
        info!(dn = %dn, "LDAP entry deleted");
        Ok(())
    }

    async fn group_members(&self, group: &str) -> Result<Vec<UserRecord>> {
        let mut ldap = self.service_connection().await?;
        let members = self.member_dns(&mut ldap, group).await;
        let _ = ldap.unbind().await;

        let Some(members) = members? else {
            warn!("Group not found: {}", group);
            return Ok(Vec::new());
        };

        debug!("Found {} members in group {}", members.len(), group);
        Ok(members
            .into_iter()
            .map(|dn| UserRecord::from_entry(dn, Vec::new()))
            .collect())
    }
}

/// Move the `member` values of one search page into `members`.
///
/// Large groups come back as `member;range=<lo>-<hi>` instead of `member`;
/// the last page ends in `*`. Returns the start of the next page, if any.
fn take_member_page(
    attrs: &mut HashMap<String, Vec<String>>,
    members: &mut Vec<String>,
) -> Option<u32> {
    let key = attrs
        .keys()
        .find(|k| k.eq_ignore_ascii_case("member") || member_range(k).is_some())
        .cloned()?;
    let values = attrs.remove(&key).unwrap_or_default();
    let page_len = values.len();
    members.extend(values);

    match member_range(&key) {
        Some((_, Some(hi))) if page_len > 0 => Some(hi + 1),
        _ => None,
    }
}

/// Parse `member;range=<lo>-<hi>`; `hi` is `None` for `*`.
fn member_range(attr: &str) -> Option<(u32, Option<u32>)> {
    let (name, options) = attr.split_once(';')?;
    if !name.eq_ignore_ascii_case("member") {
        return None;
    }
    let range = options
        .split(';')
        .find_map(|opt| {
            opt.get(..6)
                .filter(|p| p.eq_ignore_ascii_case("range="))
                .map(|_| &opt[6..])
        })?;

    let (lo, hi) = range.split_once('-')?;
    let lo = lo.parse().ok()?;
    let hi = match hi {
        "*" => None,
        n => Some(n.parse().ok()?),
    };
    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ldap_result(rc: u32, text: &str) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: text.to_string(),
            refs: Vec::new(),
            ctrls: Vec::new(),
        }
    }

    #[test]
    fn test_client_creation() {
        let config = LdapConfig {
            server_url: "ldaps://dc1.corp.com:636".to_string(),
            bind_dn: "CN=svc,CN=Users,DC=corp,DC=com".to_string(),
            bind_password: "secret".to_string(),
            base_dn: "DC=corp,DC=com".to_string(),
            ..Default::default()
        };

        let client = LdapDirectory::new(config);
        // Note: actual operations require a running directory server
        assert_eq!(client.config().base_dn, "DC=corp,DC=com");
    }

    #[test]
    fn test_result_code_mapping() {
        let dn = "CN=Jane,CN=Users,DC=corp,DC=com";

        assert!(check_result(ldap_result(0, ""), dn).is_ok());
        assert!(matches!(
            check_result(ldap_result(68, "entryAlreadyExists"), dn),
            Err(Error::EntryAlreadyExists(_))
        ));
        assert!(matches!(
            check_result(ldap_result(32, "noSuchObject"), dn),
            Err(Error::NoSuchObject(_))
        ));
        assert!(matches!(
            check_result(ldap_result(50, "insufficientAccessRights"), dn),
            Err(Error::Ldap { rc: 50, .. })
        ));
    }

    #[test]
    fn test_member_range_parsing() {
        assert_eq!(member_range("member;range=0-1499"), Some((0, Some(1499))));
        assert_eq!(member_range("Member;Range=1500-*"), Some((1500, None)));
        assert_eq!(member_range("member"), None);
        assert_eq!(member_range("memberOf;range=0-10"), None);
        assert_eq!(member_range("member;range=abc"), None);
    }

    #[test]
    fn test_member_pages() {
        let mut members = Vec::new();

        let mut attrs = HashMap::new();
        attrs.insert(
            "member;range=0-1".to_string(),
            vec!["CN=a,DC=corp,DC=com".to_string(), "CN=b,DC=corp,DC=com".to_string()],
        );
        assert_eq!(take_member_page(&mut attrs, &mut members), Some(2));

        let mut attrs = HashMap::new();
        attrs.insert("member;range=2-*".to_string(), vec!["CN=c,DC=corp,DC=com".to_string()]);
        assert_eq!(take_member_page(&mut attrs, &mut members), None);
        assert_eq!(members.len(), 3);

        let mut attrs = HashMap::new();
        attrs.insert("member".to_string(), vec!["CN=d,DC=corp,DC=com".to_string()]);
        assert_eq!(take_member_page(&mut attrs, &mut members), None);
        assert_eq!(members.last().map(String::as_str), Some("CN=d,DC=corp,DC=com"));

        let mut attrs = HashMap::new();
        assert_eq!(take_member_page(&mut attrs, &mut members), None);
        assert_eq!(members.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_password_never_binds() {
        let client = LdapDirectory::new(LdapConfig {
            server_url: "ldap://127.0.0.1:1".to_string(),
            ..Default::default()
        });

        let err = client.authenticate("jdoe@corp.com", "").await.unwrap_err();
        assert!(err.is_auth_rejection());
    }
}
