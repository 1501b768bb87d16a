//! Directory user facade for Adbridge
//!
//! Wraps an LDAP/Active Directory client with user lifecycle operations:
//! lookup with a per-username cache, creation, authentication,
//! enable/disable, moves between OUs, and removal.

pub mod cache;
pub mod directory;
pub mod dn;
pub mod ldap;
pub mod shape;
pub mod users;

#[cfg(test)]
pub(crate) mod mock;

pub use cache::UserCache;
pub use directory::DirectoryClient;
pub use dn::{location_from_dn, normalize_location};
pub use ldap::{LdapConfig, LdapDirectory};
pub use shape::{FieldSelector, ResultShaper};
pub use users::{AccountControl, UserService};
