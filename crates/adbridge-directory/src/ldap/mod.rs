//! LDAP/Active Directory backend
//!
//! Implements `DirectoryClient` over `ldap3`:
//! - user search under the base DN
//! - credential checks by binding as the user
//! - attribute replace, rename, add and delete
//! - group member listing
//! - TLS/STARTTLS support

mod client;
mod types;

pub use client::LdapDirectory;
pub use types::*;
