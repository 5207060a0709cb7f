pub mod poll;
pub mod pollconfig;

use poise::serenity_prelude as serenity;
use sqlx::SqlitePool;

use crate::db::command_registrations;
use crate::error::Error;
use crate::Data;

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![poll::poll(), pollconfig::pollconfig()]
}

/// The JSON body Discord receives when `commands` are registered.
pub fn registration_payload(commands: &[poise::Command<Data, Error>]) -> Result<String, Error> {
    let payload = poise::builtins::create_application_commands(commands);
    Ok(::serenity::json::to_string(&payload).map_err(::serenity::Error::from)?)
}

/// Register `commands` in `guild_id`, or globally when `None`.
///
/// Skipped when the same payload was already registered for that scope.
/// Returns whether Discord was called.
pub async fn register_if_changed(
    ctx: &serenity::Context,
    db: &SqlitePool,
    commands: &[poise::Command<Data, Error>],
    guild_id: Option<serenity::GuildId>,
) -> Result<bool, Error> {
    let scope = command_registrations::scope(guild_id);
    let payload = registration_payload(commands)?;
    if command_registrations::is_current(db, &scope, &payload).await? {
        return Ok(false);
    }

    match guild_id {
        Some(guild_id) => poise::builtins::register_in_guild(ctx, commands, guild_id).await?,
        None => poise::builtins::register_globally(ctx, commands).await?,
    }
    command_registrations::record(db, &scope, &payload).await?;
    Ok(true)
}
