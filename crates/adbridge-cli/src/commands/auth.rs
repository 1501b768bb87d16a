//! auth and member-of commands

use super::CommandContext;
use anyhow::Result;
use colored::Colorize;

pub async fn authenticate(ctx: &CommandContext, user: &str, password: &str) -> Result<()> {
    let outcome = ctx.service.authenticate_user(user, password).await?;

    if ctx.is_json() {
        ctx.print_json(&outcome)?;
    } else if outcome.authorized {
        println!("{}: {}", "authorized".green(), user);
    } else {
        println!(
            "{}: {} ({})",
            "denied".red(),
            user,
            outcome.message.as_deref().unwrap_or_default()
        );
        if let Some(detail) = outcome.detail.as_deref().filter(|d| !d.is_empty()) {
            println!("  {}", detail.dimmed());
        }
    }

    if !outcome.authorized {
        std::process::exit(2);
    }
    Ok(())
}

pub async fn member_of(ctx: &CommandContext, user: &str, group: &str) -> Result<()> {
    let member = ctx.service.user_is_member_of(user, group).await?;

    if ctx.is_json() {
        ctx.print_json(&serde_json::json!({ "user": user, "group": group, "member": member }))
    } else {
        let answer = if member { "yes".green() } else { "no".red() };
        println!("{} in {}: {}", user, group, answer);
        Ok(())
    }
}
