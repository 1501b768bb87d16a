//! Directory client trait
//!
//! The operations the user facade needs from a directory. `LdapDirectory`
//! implements it over `ldap3`.

use adbridge_core::types::{Modification, NewEntry, UserRecord};
use adbridge_core::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Search user entries under the base DN.
    async fn find(&self, filter: &str) -> Result<Vec<UserRecord>>;

    /// Whether an account exists for a principal (`user@domain`).
    async fn user_exists(&self, principal: &str) -> Result<bool>;

    /// Verify credentials by binding as the principal.
    ///
    /// A rejected bind is `Error::InvalidCredentials` or
    /// `Error::AccountDisabled`; anything else is a directory failure.
    async fn authenticate(&self, principal: &str, password: &str) -> Result<()>;

    /// Replace attribute values on an entry.
    async fn replace(&self, dn: &str, changes: &[Modification]) -> Result<()>;

    /// Rename or move an entry.
    async fn rename(&self, dn: &str, new_dn: &str) -> Result<()>;

    /// Create an entry. An existing DN is `Error::EntryAlreadyExists`.
    async fn create(&self, dn: &str, entry: NewEntry) -> Result<()>;

    /// Delete an entry by DN.
    async fn delete(&self, dn: &str) -> Result<()>;

    /// Members of a group, each carrying at least its `dn`.
    async fn group_members(&self, group: &str) -> Result<Vec<UserRecord>>;
}
