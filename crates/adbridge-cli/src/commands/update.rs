//! update command - change an existing user

use super::{parse_attributes, CommandContext};
use adbridge_core::types::UserUpdate;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Account to update
    pub user: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// New common name (renames the entry)
    #[arg(long)]
    pub cn: Option<String>,

    /// New account name; also rewrites uid and userPrincipalName
    #[arg(long)]
    pub new_name: Option<String>,

    #[arg(short, long)]
    pub mail: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long, env = "ADBRIDGE_NEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Replace object classes (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub object_class: Option<Vec<String>>,

    /// Whether the password expires
    #[arg(long)]
    pub password_expires: Option<bool>,

    /// Enable or disable the account
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Attribute to replace as name=value (repeatable)
    #[arg(short, long = "attr")]
    pub attributes: Vec<String>,
}

impl UpdateArgs {
    fn to_update(&self) -> Result<UserUpdate> {
        Ok(UserUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            common_name: self.cn.clone(),
            user_name: self.new_name.clone(),
            email: self.mail.clone(),
            title: self.title.clone(),
            phone: self.phone.clone(),
            password: self.password.clone(),
            object_class: self.object_class.clone(),
            password_expires: self.password_expires,
            enabled: self.enabled,
            attributes: parse_attributes(&self.attributes)?,
        })
    }
}

pub async fn execute(ctx: &CommandContext, args: UpdateArgs) -> Result<()> {
    let update = args.to_update()?;
    if update.is_empty() {
        anyhow::bail!("Nothing to update for {}", args.user);
    }

    ctx.service.update_user(&args.user, update).await?;

    let current = args.new_name.as_deref().unwrap_or(&args.user);
    ctx.done("update", current)
}
