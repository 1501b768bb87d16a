//! In-memory directory for service tests

use crate::directory::DirectoryClient;
use crate::dn::{dn_eq, leaf_value};
use adbridge_core::types::{Modification, NewEntry, UserRecord};
use adbridge_core::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A recorded directory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    UserExists(String),
    Authenticate(String),
    Replace(String, Vec<Modification>),
    Rename(String, String),
    Create(String),
    Delete(String),
    GroupMembers(String),
}

#[derive(Default)]
struct State {
    entries: Vec<UserRecord>,
    groups: HashMap<String, Vec<String>>,
    passwords: HashMap<String, String>,
    disabled: Vec<String>,
    calls: Vec<Call>,
    fail_create: Option<u32>,
    fail_replace_on: Option<String>,
    offline: bool,
}

#[derive(Default)]
pub struct MockDirectory {
    state: Mutex<State>,
}

/// Value of `attr=` inside a filter, up to the closing paren
fn filter_value<'a>(filter: &'a str, attr: &str) -> Option<&'a str> {
    let needle = format!("({}=", attr);
    let start = filter.find(&needle)? + needle.len();
    let end = filter[start..].find(')')? + start;
    Some(&filter[start..end])
}

fn matches_account(entry: &UserRecord, principal: Option<&str>, account: Option<&str>) -> bool {
    let eq = |attr: &str, want: Option<&str>| match (entry.get(attr), want) {
        (Some(have), Some(want)) => have.eq_ignore_ascii_case(want),
        _ => false,
    };
    eq("userPrincipalName", principal) || eq("sAMAccountName", account)
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: UserRecord) -> Self {
        self.state.lock().unwrap().entries.push(user);
        self
    }

    pub fn with_group(self, group: &str, members: &[&str]) -> Self {
        self.state.lock().unwrap().groups.insert(
            group.to_lowercase(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_password(self, principal: &str, password: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .passwords
            .insert(principal.to_lowercase(), password.to_string());
        self
    }

    pub fn with_disabled(self, principal: &str) -> Self {
        self.state.lock().unwrap().disabled.push(principal.to_lowercase());
        self
    }

    /// Make every `create` fail with this result code
    pub fn failing_create(self, rc: u32) -> Self {
        self.state.lock().unwrap().fail_create = Some(rc);
        self
    }

    /// Make `replace` fail when it writes this attribute
    pub fn failing_replace_on(self, attribute: &str) -> Self {
        self.state.lock().unwrap().fail_replace_on = Some(attribute.to_string());
        self
    }

    /// Make every call fail as if the server were unreachable
    pub fn offline(self) -> Self {
        self.state.lock().unwrap().offline = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn find_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Find(_)))
            .count()
    }

    pub fn replaces(&self) -> Vec<(String, Vec<Modification>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Replace(dn, changes) => Some((dn, changes)),
                _ => None,
            })
            .collect()
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Rename(from, to) => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn entry(&self, dn: &str) -> Option<UserRecord> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.dn().map(|d| dn_eq(d, dn)).unwrap_or(false))
            .cloned()
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(Error::Connection("directory unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn find(&self, filter: &str) -> Result<Vec<UserRecord>> {
        self.record(Call::Find(filter.to_string()))?;

        let principal = filter_value(filter, "userPrincipalName");
        let account = filter_value(filter, "sAMAccountName");

        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .iter()
            .filter(|e| matches_account(e, principal, account))
            .cloned()
            .collect())
    }

    async fn user_exists(&self, principal: &str) -> Result<bool> {
        self.record(Call::UserExists(principal.to_string()))?;

        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .iter()
            .any(|e| matches_account(e, Some(principal), None)))
    }

    async fn authenticate(&self, principal: &str, password: &str) -> Result<()> {
        self.record(Call::Authenticate(principal.to_string()))?;

        let state = self.state.lock().unwrap();
        let key = principal.to_lowercase();
        if state.disabled.contains(&key) {
            return Err(Error::AccountDisabled {
                detail: "data 533".into(),
            });
        }
        match state.passwords.get(&key) {
            Some(expected) if !password.is_empty() && expected == password => Ok(()),
            _ => Err(Error::InvalidCredentials {
                detail: "data 52e".into(),
            }),
        }
    }

    async fn replace(&self, dn: &str, changes: &[Modification]) -> Result<()> {
        self.record(Call::Replace(dn.to_string(), changes.to_vec()))?;

        let mut state = self.state.lock().unwrap();
        if let Some(attr) = &state.fail_replace_on {
            if changes.iter().any(|c| c.is(attr)) {
                return Err(Error::Ldap {
                    rc: 19,
                    message: "constraintViolation".into(),
                });
            }
        }

        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.dn().map(|d| dn_eq(d, dn)).unwrap_or(false))
            .ok_or_else(|| Error::NoSuchObject(dn.to_string()))?;

        for change in changes {
            let values = change
                .values
                .iter()
                .map(|v| match v.as_text() {
                    Some(text) => text.to_string(),
                    None => String::from_utf8_lossy(v.as_bytes()).into_owned(),
                })
                .collect();
            entry.insert(change.attribute.clone(), values);
        }
        Ok(())
    }

    async fn rename(&self, dn: &str, new_dn: &str) -> Result<()> {
        self.record(Call::Rename(dn.to_string(), new_dn.to_string()))?;

        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.dn().map(|d| dn_eq(d, dn)).unwrap_or(false))
            .ok_or_else(|| Error::NoSuchObject(dn.to_string()))?;

        entry.set("dn", new_dn);
        if let Some(cn) = leaf_value(new_dn) {
            entry.set("cn", cn);
        }
        Ok(())
    }

    async fn create(&self, dn: &str, entry: NewEntry) -> Result<()> {
        self.record(Call::Create(dn.to_string()))?;

        let mut state = self.state.lock().unwrap();
        if let Some(rc) = state.fail_create {
            return Err(Error::Ldap {
                rc,
                message: "create refused".into(),
            });
        }

        let exists = state.entries.iter().any(|e| {
            e.dn().map(|d| dn_eq(d, dn)).unwrap_or(false)
                || entry.iter().any(|(name, values)| {
                    name.eq_ignore_ascii_case("sAMAccountName")
                        && values
                            .first()
                            .and_then(|v| v.as_text())
                            .zip(e.get("sAMAccountName"))
                            .map(|(a, b)| a.eq_ignore_ascii_case(b))
                            .unwrap_or(false)
                })
        });
        if exists {
            return Err(Error::EntryAlreadyExists(dn.to_string()));
        }

        let record = UserRecord::from_entry(
            dn,
            entry.into_iter().map(|(name, values)| {
                let values = values
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .collect();
                (name, values)
            }),
        );
        state.entries.push(record);
        Ok(())
    }

    async fn delete(&self, dn: &str) -> Result<()> {
        self.record(Call::Delete(dn.to_string()))?;

        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        state
            .entries
            .retain(|e| !e.dn().map(|d| dn_eq(d, dn)).unwrap_or(false));
        if state.entries.len() == before {
            return Err(Error::NoSuchObject(dn.to_string()));
        }
        Ok(())
    }

    async fn group_members(&self, group: &str) -> Result<Vec<UserRecord>> {
        self.record(Call::GroupMembers(group.to_string()))?;

        let state = self.state.lock().unwrap();
        Ok(state
            .groups
            .get(&group.to_lowercase())
            .map(|members| {
                members
                    .iter()
                    .map(|dn| UserRecord::from_entry(dn.clone(), Vec::new()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
