//! find, exists, location and members commands

use super::CommandContext;
use adbridge_core::types::FindOptions;
use anyhow::Result;
use colored::Colorize;

pub async fn find(ctx: &CommandContext, user: &str, fields: Vec<String>) -> Result<()> {
    let options = FindOptions::fields(fields);
    let record = ctx.service.find_user_with(user, &options).await?;
    ctx.print_record(&record)
}

pub async fn exists(ctx: &CommandContext, user: &str) -> Result<()> {
    let exists = ctx.service.user_exists(user).await?;

    if ctx.is_json() {
        ctx.print_json(&serde_json::json!({ "user": user, "exists": exists }))
    } else {
        let answer = if exists { "yes".green() } else { "no".red() };
        println!("{}: {}", user, answer);
        Ok(())
    }
}

pub async fn location(ctx: &CommandContext, user: &str) -> Result<()> {
    let location = ctx.service.get_user_location(user).await?;

    if ctx.is_json() {
        ctx.print_json(&serde_json::json!({ "user": user, "location": location }))
    } else {
        println!("{}", location);
        Ok(())
    }
}

pub async fn members(ctx: &CommandContext, group: &str) -> Result<()> {
    let members = ctx.service.get_group_members(group).await?;

    if ctx.is_json() {
        return ctx.print_json(&members);
    }

    for dn in members.iter().filter_map(|m| m.dn()) {
        println!("{}", dn);
    }
    ctx.info(&format!("{} member(s)", members.len()).dimmed().to_string());
    Ok(())
}
