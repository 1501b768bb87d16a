//! Per-username cache of directory lookups
//!
//! Entries never expire. Every write through `UserService` invalidates the
//! affected names instead.

use adbridge_core::types::UserRecord;
use adbridge_core::utils::strip_domain;
use std::collections::HashMap;

/// Lookup results keyed by account name.
///
/// A cached empty record means the directory had no such user.
#[derive(Debug, Default)]
pub struct UserCache {
    users: HashMap<String, UserRecord>,
}

/// Cache key for a bare or `user@domain` name. Account names compare
/// case-insensitively in AD.
pub fn cache_key(user_name: &str) -> String {
    strip_domain(user_name.trim()).to_lowercase()
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_name: &str) -> Option<&UserRecord> {
        self.users.get(&cache_key(user_name))
    }

    pub fn insert(&mut self, user_name: &str, user: UserRecord) {
        self.users.insert(cache_key(user_name), user);
    }

    /// Drop the entry for a name; returns whether one was present.
    pub fn invalidate(&mut self, user_name: &str) -> bool {
        self.users.remove(&cache_key(user_name)).is_some()
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        assert_eq!(cache_key("JDoe@corp.com"), "jdoe");
        assert_eq!(cache_key(" jdoe "), "jdoe");
    }

    #[test]
    fn test_principal_and_bare_share_entry() {
        let mut cache = UserCache::new();
        cache.insert("jdoe@corp.com", UserRecord::new().with("cn", "Jane"));

        assert_eq!(cache.get("jdoe").and_then(|u| u.get("cn")), Some("Jane"));
        assert!(cache.invalidate("JDOE"));
        assert!(cache.get("jdoe").is_none());
        assert!(!cache.invalidate("jdoe"));
    }

    #[test]
    fn test_not_found_sentinel() {
        let mut cache = UserCache::new();
        cache.insert("ghost", UserRecord::new());

        let hit = cache.get("ghost").unwrap();
        assert!(hit.is_empty());
        assert_eq!(cache.len(), 1);
    }
}
