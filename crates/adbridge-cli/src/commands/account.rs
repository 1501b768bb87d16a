//! Account state commands: password, enable/disable, unlock, move, remove

use super::CommandContext;
use anyhow::Result;

pub async fn set_password(ctx: &CommandContext, user: &str, password: &str) -> Result<()> {
    ctx.service.set_user_password(user, password).await?;
    ctx.done("set_password", user)
}

pub async fn never_expires(ctx: &CommandContext, user: &str) -> Result<()> {
    ctx.service.set_user_password_never_expires(user).await?;
    ctx.done("password_never_expires", user)
}

pub async fn enable(ctx: &CommandContext, user: &str) -> Result<()> {
    ctx.service.enable_user(user).await?;
    ctx.done("enable", user)
}

pub async fn disable(ctx: &CommandContext, user: &str) -> Result<()> {
    ctx.service.disable_user(user).await?;
    ctx.done("disable", user)
}

pub async fn unlock(ctx: &CommandContext, user: &str) -> Result<()> {
    ctx.service.unlock_user(user).await?;
    ctx.done("unlock", user)
}

pub async fn move_user(ctx: &CommandContext, user: &str, location: &str) -> Result<()> {
    ctx.service.move_user(user, location).await?;

    if ctx.is_json() {
        let location = ctx.service.get_user_location(user).await?;
        ctx.print_json(&serde_json::json!({ "success": true, "action": "move", "user": user, "location": location }))
    } else {
        ctx.done("move", user)
    }
}

pub async fn remove(ctx: &CommandContext, user: &str) -> Result<()> {
    ctx.service.remove_user(user).await?;
    ctx.done("remove", user)
}
