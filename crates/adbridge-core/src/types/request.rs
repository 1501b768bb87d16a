//! Request types for user lifecycle operations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input for creating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewUser {
    /// Account name, written to `sAMAccountName` and `uid`
    pub user_name: String,

    /// Email address, written to `mail`
    pub mail: String,

    #[serde(default)]
    pub common_name: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Target location (DN fragment or slash path)
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub password_expires: Option<bool>,

    #[serde(default)]
    pub enabled: Option<bool>,

    /// Extra attributes written verbatim
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl NewUser {
    pub fn new(user_name: impl Into<String>, mail: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            mail: mail.into(),
            ..Default::default()
        }
    }
}

/// Changes to an existing user. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub common_name: Option<String>,

    /// New account name; also rewrites `uid` and `userPrincipalName`
    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub object_class: Option<Vec<String>>,

    #[serde(default)]
    pub password_expires: Option<bool>,

    #[serde(default)]
    pub enabled: Option<bool>,

    /// Extra attributes replaced verbatim
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.common_name.is_none()
            && self.user_name.is_none()
            && self.email.is_none()
            && self.title.is_none()
            && self.phone.is_none()
            && self.password.is_none()
            && self.object_class.is_none()
            && self.password_expires.is_none()
            && self.enabled.is_none()
            && self.attributes.is_empty()
    }
}

/// Result shaping for lookups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    /// Attribute names to keep; empty keeps everything
    #[serde(default)]
    pub fields: Vec<String>,
}

impl FindOptions {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}
