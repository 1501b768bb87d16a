//! User lifecycle facade
//!
//! `UserService` turns friendly requests into directory writes and keeps a
//! per-username cache of lookups. Any write that touches a user drops that
//! user's cache entry (and the new name's entry after a rename), so the next
//! lookup goes back to the directory.
//!
//! Multi-step flows run one step at a time; each step waits for the previous
//! write to land. Concurrent calls for the same user are not serialized.

use crate::cache::{cache_key, UserCache};
use crate::directory::DirectoryClient;
use crate::dn::{leaf_value, location_from_dn, normalize_location, rename_leaf, user_dn, dn_eq};
use crate::ldap::user_filter;
use crate::shape::{FieldSelector, ResultShaper};
use adbridge_core::config::{AdbridgeConfig, DirectoryConfig, PasswordPolicy};
use adbridge_core::types::{
    AttrValue, AuthOutcome, CreatedUser, FindOptions, Modification, NewEntry, NewUser,
    UserRecord, UserUpdate,
};
use adbridge_core::utils::{is_correct_email, strip_domain};
use adbridge_core::{Error, Result};
use adbridge_crypto::{create_password, encode_unicode_pwd, ssha_hash, UNICODE_PWD_ATTRIBUTE};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};


/// Fixed `userAccountControl` writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountControl {
    /// Normal account, enabled
    Enabled,
    /// Normal account, disabled
    Disabled,
    /// Normal account, enabled, password never expires
    PasswordNeverExpires,
}

impl AccountControl {
    pub fn value(self) -> u32 {
        match self {
            AccountControl::Enabled => adbridge_core::UAC_ENABLED,
            AccountControl::Disabled => adbridge_core::UAC_DISABLED,
            AccountControl::PasswordNeverExpires => adbridge_core::UAC_PASSWORD_NEVER_EXPIRES,
        }
    }

    pub fn for_enabled(enabled: bool) -> Self {
        if enabled {
            AccountControl::Enabled
        } else {
            AccountControl::Disabled
        }
    }

    pub fn for_password_expires(expires: bool) -> Self {
        if expires {
            AccountControl::Enabled
        } else {
            AccountControl::PasswordNeverExpires
        }
    }

    /// Follow-up write for a freshly created account, if any.
    ///
    /// Accounts created with `enabled: false` are left as the directory made them.
    pub fn for_new_account(password_expires: Option<bool>, enabled: Option<bool>) -> Option<Self> {
        match (password_expires, enabled) {
            (_, Some(false)) => None,
            (Some(false), _) => Some(AccountControl::PasswordNeverExpires),
            _ => Some(AccountControl::Enabled),
        }
    }
}

/// Directory user facade with a lookup cache
pub struct UserService {
    directory: Arc<dyn DirectoryClient>,
    config: DirectoryConfig,
    password_policy: PasswordPolicy,
    shaper: Arc<dyn ResultShaper>,
    cache: Arc<RwLock<UserCache>>,
}

impl UserService {
    pub fn new(directory: Arc<dyn DirectoryClient>, config: &AdbridgeConfig) -> Self {
        Self {
            directory,
            config: config.directory.clone(),
            password_policy: config.password.clone(),
            shaper: Arc::new(FieldSelector),
            cache: Arc::new(RwLock::new(UserCache::new())),
        }
    }

    /// Replace the result shaper used by `find_user_with`
    pub fn with_shaper(mut self, shaper: Arc<dyn ResultShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find a user by bare or `user@domain` name. Returns an empty record
    /// when there is no such user.
    pub async fn find_user(&self, user_name: &str) -> Result<UserRecord> {
        self.find_user_with(user_name, &FindOptions::default()).await
    }

    /// `find_user` with result shaping applied
    pub async fn find_user_with(&self, user_name: &str, options: &FindOptions) -> Result<UserRecord> {
        let record = self.lookup(user_name).await?;
        Ok(self
            .shaper
            .shape(options, vec![record])
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    /// Whether the directory has an account for this name
    pub async fn user_exists(&self, user_name: &str) -> Result<bool> {
        let principal = self.config.principal(user_name);
        self.directory.user_exists(&principal).await
    }

    /// Unshaped cached lookup
    async fn lookup(&self, user_name: &str) -> Result<UserRecord> {
        let key = cache_key(user_name);
        if key.is_empty() {
            return Ok(UserRecord::new());
        }

        if let Some(cached) = self.cache.read().await.get(&key) {
            debug!("Found cached user: {}", key);
            return Ok(cached.clone());
        }

        let filter = user_filter(&key, &self.config.domain);
        let user = self
            .directory
            .find(&filter)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        self.cache.write().await.insert(&key, user.clone());
        Ok(user)
    }

    /// Lookup that fails when the user is missing. Returns the record and its DN.
    async fn require_user(&self, user_name: &str) -> Result<(UserRecord, String)> {
        let user = self.lookup(user_name).await?;
        match user.dn() {
            Some(dn) if !user.is_empty() => {
                let dn = dn.to_string();
                Ok((user, dn))
            }
            _ => Err(Error::UserNotFound(user_name.to_string())),
        }
    }

    async fn invalidate(&self, user_name: &str) {
        if self.cache.write().await.invalidate(user_name) {
            debug!("Invalidated cached user: {}", cache_key(user_name));
        }
    }

    /// Drop every cached lookup
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        info!("User cache cleared");
    }

    /// Number of cached lookups, including not-found entries
    pub async fn cached_users(&self) -> usize {
        self.cache.read().await.len()
    }

    // =========================================================================
    // Attribute writes
    // =========================================================================

    /// Replace attributes on a user, then drop its cache entry
    pub async fn set_user_properties(&self, user_name: &str, changes: Vec<Modification>) -> Result<()> {
        let (_, dn) = self.require_user(user_name).await?;
        self.directory.replace(&dn, &changes).await?;
        self.invalidate(user_name).await;
        Ok(())
    }

    pub async fn set_user_property(
        &self,
        user_name: &str,
        attribute: &str,
        value: impl Into<AttrValue>,
    ) -> Result<()> {
        self.set_user_properties(user_name, vec![Modification::replace(attribute, value)])
            .await
    }

    /// Rename the user's entry to `CN=<common_name>` in the same container
    pub async fn set_user_cn(&self, user_name: &str, common_name: &str) -> Result<()> {
        let (_, dn) = self.require_user(user_name).await?;
        let new_dn = rename_leaf(&dn, common_name);

        self.directory.rename(&dn, &new_dn).await?;
        self.invalidate(user_name).await;
        info!("Renamed {} to {}", user_name, new_dn);
        Ok(())
    }

    pub async fn set_user_password(&self, user_name: &str, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(Error::MissingPassword);
        }

        self.set_user_property(
            user_name,
            UNICODE_PWD_ATTRIBUTE,
            AttrValue::Binary(encode_unicode_pwd(password)),
        )
        .await?;
        info!("Password set for {}", user_name);
        Ok(())
    }

    pub async fn set_account_control(&self, user_name: &str, control: AccountControl) -> Result<()> {
        self.set_user_property(user_name, "userAccountControl", control.value())
            .await?;
        info!("Account control for {} set to {:?}", user_name, control);
        Ok(())
    }

    pub async fn set_user_password_never_expires(&self, user_name: &str) -> Result<()> {
        self.set_account_control(user_name, AccountControl::PasswordNeverExpires)
            .await
    }

    pub async fn enable_user(&self, user_name: &str) -> Result<()> {
        self.set_account_control(user_name, AccountControl::Enabled)
            .await
    }

    pub async fn disable_user(&self, user_name: &str) -> Result<()> {
        self.set_account_control(user_name, AccountControl::Disabled)
            .await
    }

    /// Clear a lockout by resetting `lockoutTime`
    pub async fn unlock_user(&self, user_name: &str) -> Result<()> {
        self.set_user_property(user_name, "lockoutTime", "0").await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a user with a generated password.
    ///
    /// The password is set and the account enabled as separate writes after
    /// the entry exists; the add itself does not reliably leave a usable
    /// password. A failure in any of these steps, other than a duplicate
    /// account, is reported as `CreationFailed`.
    pub async fn add_user(&self, new_user: NewUser) -> Result<CreatedUser> {
        let user_name = strip_domain(new_user.user_name.trim()).to_string();
        if user_name.is_empty() {
            return Err(Error::MissingUserName);
        }
        if !is_correct_email(&new_user.mail) {
            return Err(Error::InvalidEmail(new_user.mail.clone()));
        }

        let (first_name, last_name, common_name) = derive_names(&new_user, &user_name);
        let password = create_password(&self.password_policy)?;

        let location = normalize_location(
            new_user
                .location
                .as_deref()
                .filter(|l| !l.trim().is_empty())
                .or(Some(self.config.default_location.as_str())),
        );
        let dn = user_dn(&common_name, &location, &self.config.base_dn);
        let entry = self.new_entry(&new_user, &user_name, &common_name, first_name, last_name, &password);

        debug!(dn = %dn, "Creating user {}", user_name);

        match self.directory.create(&dn, entry).await {
            Ok(()) => {}
            Err(Error::EntryAlreadyExists(_)) => {
                warn!("User already exists: {}", user_name);
                return Err(Error::AlreadyExists(user_name));
            }
            Err(e) => return Err(Error::CreationFailed(e.to_string())),
        }
        self.invalidate(&user_name).await;

        let control = AccountControl::for_new_account(new_user.password_expires, new_user.enabled);
        if let Err(e) = self.activate_account(&user_name, &password, control).await {
            warn!(dn = %dn, "User {} created but not activated: {}", user_name, e);
            return Err(Error::CreationFailed(e.to_string()));
        }

        let user = self
            .lookup(&user_name)
            .await
            .map_err(|e| Error::CreationFailed(e.to_string()))?;
        info!(dn = %dn, "User {} created", user_name);

        Ok(CreatedUser { user, password })
    }

    /// Password and account-control writes that follow a create
    async fn activate_account(
        &self,
        user_name: &str,
        password: &str,
        control: Option<AccountControl>,
    ) -> Result<()> {
        self.set_user_password(user_name, password).await?;
        if let Some(control) = control {
            self.set_account_control(user_name, control).await?;
        }
        Ok(())
    }

    fn new_entry(
        &self,
        new_user: &NewUser,
        user_name: &str,
        common_name: &str,
        first_name: Option<String>,
        last_name: Option<String>,
        password: &str,
    ) -> NewEntry {
        let text = |v: &str| vec![AttrValue::from(v)];

        let mut entry: NewEntry = vec![
            (
                "objectClass".to_string(),
                self.config
                    .user_object_classes
                    .iter()
                    .map(|c| AttrValue::from(c.as_str()))
                    .collect(),
            ),
            ("cn".to_string(), text(common_name)),
            ("displayName".to_string(), text(common_name)),
            ("sAMAccountName".to_string(), text(user_name)),
            ("uid".to_string(), text(user_name)),
            (
                "userPrincipalName".to_string(),
                text(&self.config.principal(user_name)),
            ),
            ("mail".to_string(), text(new_user.mail.trim())),
            ("userPassword".to_string(), text(&ssha_hash(password))),
        ];

        let optional = [
            ("givenName", first_name.as_deref()),
            ("sn", last_name.as_deref()),
            ("title", new_user.title.as_deref()),
            ("telephoneNumber", new_user.phone.as_deref()),
        ];
        for (name, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                entry.push((name.to_string(), text(value)));
            }
        }

        for (name, value) in &new_user.attributes {
            entry.push((name.clone(), text(value)));
        }

        entry
    }

    /// Delete a user
    pub async fn remove_user(&self, user_name: &str) -> Result<()> {
        let (_, dn) = self.require_user(user_name).await?;
        self.directory.delete(&dn).await?;
        self.invalidate(user_name).await;
        info!(dn = %dn, "User {} removed", user_name);
        Ok(())
    }

    /// Move a user to another container. `location` is a DN fragment or
    /// slash path; empty means the default users container.
    pub async fn move_user(&self, user_name: &str, location: &str) -> Result<()> {
        let (user, dn) = self.require_user(user_name).await?;

        let common_name = user
            .common_name()
            .map(str::to_string)
            .or_else(|| leaf_value(&dn))
            .ok_or_else(|| Error::InvalidArgument(format!("No common name on {}", dn)))?;

        let location = normalize_location(Some(location));
        let new_dn = user_dn(&common_name, &location, &self.config.base_dn);

        self.directory.rename(&dn, &new_dn).await?;
        self.invalidate(user_name).await;
        info!("Moved {} to {}", user_name, new_dn);
        Ok(())
    }

    /// Readable location of a user, such as `EMEA/Sales`
    pub async fn get_user_location(&self, user_name: &str) -> Result<String> {
        let (_, dn) = self.require_user(user_name).await?;
        Ok(location_from_dn(&dn))
    }

    /// Apply an update.
    ///
    /// Common name, password expiry and enabled state are applied first.
    /// Attribute writes follow one at a time, in reverse collection order;
    /// the first failure stops the rest. An account rename writes
    /// `userPrincipalName` first and continues under the new name.
    pub async fn update_user(&self, user_name: &str, update: UserUpdate) -> Result<()> {
        self.require_user(user_name).await?;

        if let Some(common_name) = &update.common_name {
            self.set_user_cn(user_name, common_name).await?;
        }
        if let Some(expires) = update.password_expires {
            self.set_account_control(user_name, AccountControl::for_password_expires(expires))
                .await?;
        }
        if let Some(enabled) = update.enabled {
            self.set_account_control(user_name, AccountControl::for_enabled(enabled))
                .await?;
        }

        let mut current = user_name.to_string();
        for change in self.collect_writes(&update).into_iter().rev() {
            let renamed_to = if change.is("userPrincipalName") {
                change.text().map(str::to_string)
            } else {
                None
            };

            self.set_user_properties(&current, vec![change]).await?;

            if let Some(principal) = renamed_to {
                current = principal;
                self.invalidate(&current).await;
            }
        }

        self.invalidate(&current).await;
        self.invalidate(user_name).await;
        info!("User {} updated", user_name);
        Ok(())
    }

    /// Attribute writes for an update, in collection order. Account-name
    /// writes come last.
    fn collect_writes(&self, update: &UserUpdate) -> Vec<Modification> {
        let mut writes = Vec::new();

        let fields = [
            ("givenName", &update.first_name),
            ("sn", &update.last_name),
            ("mail", &update.email),
            ("title", &update.title),
            ("telephoneNumber", &update.phone),
        ];
        for (attribute, value) in fields {
            if let Some(value) = value {
                writes.push(Modification::replace(attribute, value.as_str()));
            }
        }

        if let Some(password) = &update.password {
            writes.push(Modification::replace(
                UNICODE_PWD_ATTRIBUTE,
                AttrValue::Binary(encode_unicode_pwd(password)),
            ));
        }
        if let Some(classes) = &update.object_class {
            writes.push(Modification::replace_all(
                "objectClass",
                classes.iter().map(|c| AttrValue::from(c.as_str())).collect(),
            ));
        }
        for (attribute, value) in &update.attributes {
            writes.push(Modification::replace(attribute.as_str(), value.as_str()));
        }

        if let Some(new_name) = &update.user_name {
            let new_name = strip_domain(new_name.trim());
            writes.push(Modification::replace("sAMAccountName", new_name));
            writes.push(Modification::replace("uid", new_name));
            writes.push(Modification::replace(
                "userPrincipalName",
                self.config.principal(new_name),
            ));
        }

        writes
    }

    // =========================================================================
    // Groups and authentication
    // =========================================================================

    /// Whether the user's DN is among the group's members. Membership is
    /// fetched on every call.
    pub async fn user_is_member_of(&self, user_name: &str, group: &str) -> Result<bool> {
        let user = self.lookup(user_name).await?;
        let Some(user_dn) = user.dn() else {
            debug!("No DN for {}, not a member of {}", user_name, group);
            return Ok(false);
        };

        let members = self.directory.group_members(group).await?;
        Ok(members
            .iter()
            .filter_map(UserRecord::dn)
            .any(|member| dn_eq(member, user_dn)))
    }

    pub async fn get_group_members(&self, group: &str) -> Result<Vec<UserRecord>> {
        self.directory.group_members(group).await
    }

    /// Check credentials. A rejected bind comes back as an unauthorized
    /// outcome; only directory failures are errors.
    pub async fn authenticate_user(&self, user_name: &str, password: &str) -> Result<AuthOutcome> {
        let principal = self.config.principal(user_name);

        match self.directory.authenticate(&principal, password).await {
            Ok(()) => {
                debug!("Authenticated {}", principal);
                Ok(AuthOutcome::granted())
            }
            Err(e) if e.is_auth_rejection() => {
                warn!("Authentication rejected for {}: {}", principal, e.code());
                Ok(AuthOutcome::denied(e.code(), e.detail().unwrap_or_default()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Given name, surname and common name for a new user.
///
/// Missing first/last names are taken from the common name; a missing
/// common name is built from the names, falling back to the account name.
fn derive_names(new_user: &NewUser, user_name: &str) -> (Option<String>, Option<String>, String) {
    let non_empty = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut first_name = non_empty(&new_user.first_name);
    let mut last_name = non_empty(&new_user.last_name);

    let common_name = match non_empty(&new_user.common_name) {
        Some(cn) => {
            let mut parts = cn.split_whitespace();
            if first_name.is_none() {
                first_name = parts.next().map(str::to_string);
            } else {
                parts.next();
            }
            if last_name.is_none() {
                let rest = parts.collect::<Vec<_>>().join(" ");
                if !rest.is_empty() {
                    last_name = Some(rest);
                }
            }
            cn
        }
        None => match (&first_name, &last_name) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => user_name.to_string(),
        },
    };

    (first_name, last_name, common_name)
}
