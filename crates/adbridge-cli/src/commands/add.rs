//! add command - create a user

use super::{parse_attributes, CommandContext};
use adbridge_core::types::NewUser;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Account name (sAMAccountName)
    pub user: String,

    /// Email address
    #[arg(short, long)]
    pub mail: String,

    /// Common name; defaults to "<first> <last>" or the account name
    #[arg(long)]
    pub cn: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Target location (DN fragment or path like EMEA/Sales)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Create the account with a password that never expires
    #[arg(long)]
    pub password_never_expires: bool,

    /// Leave the account disabled
    #[arg(long)]
    pub disabled: bool,

    /// Extra attribute as name=value (repeatable)
    #[arg(short, long = "attr")]
    pub attributes: Vec<String>,
}

impl AddArgs {
    fn into_new_user(self) -> Result<NewUser> {
        Ok(NewUser {
            attributes: parse_attributes(&self.attributes)?,
            user_name: self.user,
            mail: self.mail,
            common_name: self.cn,
            first_name: self.first_name,
            last_name: self.last_name,
            title: self.title,
            phone: self.phone,
            location: self.location,
            password_expires: self.password_never_expires.then_some(false),
            enabled: self.disabled.then_some(false),
        })
    }
}

pub async fn execute(ctx: &CommandContext, args: AddArgs) -> Result<()> {
    let created = ctx.service.add_user(args.into_new_user()?).await?;

    if ctx.is_json() {
        return ctx.print_json(&created);
    }

    ctx.print_record(&created.user)?;
    println!();
    println!("  {}: {}", "Initial password".yellow().bold(), created.password);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AddArgs {
        AddArgs {
            user: "ssmith".to_string(),
            mail: "sam.smith@corp.com".to_string(),
            cn: None,
            first_name: Some("Sam".to_string()),
            last_name: None,
            title: None,
            phone: None,
            location: None,
            password_never_expires: false,
            disabled: false,
            attributes: vec!["department=Sales".to_string()],
        }
    }

    #[test]
    fn test_flags_map_to_account_options() {
        let user = args().into_new_user().unwrap();
        assert_eq!(user.password_expires, None);
        assert_eq!(user.enabled, None);
        assert_eq!(user.attributes.get("department").map(String::as_str), Some("Sales"));

        let mut flagged = args();
        flagged.password_never_expires = true;
        flagged.disabled = true;
        let user = flagged.into_new_user().unwrap();
        assert_eq!(user.password_expires, Some(false));
        assert_eq!(user.enabled, Some(false));
    }
}
