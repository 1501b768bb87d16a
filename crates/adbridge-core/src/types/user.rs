//! User types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute key carrying an entry's distinguished name
pub const DN_ATTRIBUTE: &str = "dn";

/// Directory user entry as a sparse attribute map.
///
/// Attributes pass through verbatim from the directory. An empty record is
/// the "not found" answer for a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    attributes: BTreeMap<String, Vec<String>>,
}

impl UserRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a DN and the raw attributes returned by a search
    pub fn from_entry<I>(dn: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut record = Self {
            attributes: attrs.into_iter().collect(),
        };
        record.set(DN_ATTRIBUTE, dn);
        record
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn dn(&self) -> Option<&str> {
        self.get(DN_ATTRIBUTE)
    }

    /// Common name, read from `cn` (any case)
    pub fn common_name(&self) -> Option<&str> {
        self.get("cn")
    }

    /// First value of an attribute. Names match case-insensitively, as in LDAP.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    pub fn get_all(&self, name: &str) -> Option<&Vec<String>> {
        self.attributes.get(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    /// Replace an attribute with a single value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), vec![value.into()]);
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.attributes.insert(name.into(), values);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.attributes.remove(name)
    }

    /// Keep only attributes for which `keep` returns true
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.attributes.retain(|k, _| keep(k));
    }

    pub fn attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.attributes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.attributes.iter()
    }
}

/// Result of a successful `add_user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUser {
    /// The entry as read back after creation
    pub user: UserRecord,
    /// Generated initial password
    pub password: String,
}

/// Outcome of a credential check.
///
/// A rejected bind is reported here rather than as an error, so callers can
/// tell "credentials rejected" apart from "directory unavailable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub authorized: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Server diagnostic for a rejected bind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuthOutcome {
    pub fn granted() -> Self {
        Self {
            authorized: true,
            ..Default::default()
        }
    }

    pub fn denied(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            authorized: false,
            message: Some(message.into()),
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_entry() {
        let record = UserRecord::from_entry(
            "CN=Jane Doe,OU=Sales,DC=corp,DC=com",
            vec![
                ("sAMAccountName".to_string(), vec!["jdoe".to_string()]),
                ("CN".to_string(), vec!["Jane Doe".to_string()]),
            ],
        );

        assert_eq!(record.dn(), Some("CN=Jane Doe,OU=Sales,DC=corp,DC=com"));
        assert_eq!(record.get("samaccountname"), Some("jdoe"));
        assert_eq!(record.common_name(), Some("Jane Doe"));
        assert!(!record.is_empty());
    }

    #[test]
    fn test_empty_record_serializes_as_empty_object() {
        let json = serde_json::to_string(&UserRecord::new()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_retain() {
        let mut record = UserRecord::new()
            .with("dn", "CN=a,DC=corp,DC=com")
            .with("mail", "a@corp.com")
            .with("title", "Engineer");
        record.retain(|k| k == "mail");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("mail"), Some("a@corp.com"));
    }
}
