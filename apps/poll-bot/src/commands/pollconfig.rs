use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::info;

use crate::db::server_configs::{self, ConfigUpdate};
use crate::utils::color::normalize_color;
use crate::utils::embeds;
use crate::utils::emojis::parse_emoji_list;
use crate::utils::permissions::ensure_manage_guild;
use crate::Context;

type Error = crate::error::Error;

const MAX_BOT_NAME_LEN: usize = 50;

/// Configure poll bot settings for this server (Admin only).
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD",
    subcommands(
        "config_channel",
        "config_role",
        "config_color",
        "config_emojis",
        "config_name",
        "config_view"
    ),
    subcommand_required
)]
pub async fn pollconfig(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the default channel for polls.
#[poise::command(slash_command, guild_only, rename = "channel")]
pub async fn config_channel(
    ctx: Context<'_>,
    #[description = "The channel where polls will be posted"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    ensure_manage_guild(ctx).await?;
    let update = ConfigUpdate {
        poll_channel_id: Some(channel.id),
        ..Default::default()
    };
    save(
        ctx,
        update,
        format!("Polls will be posted in {}.", channel.id.mention()),
    )
    .await
}

/// Set the role to ping for new polls.
#[poise::command(slash_command, guild_only, rename = "role")]
pub async fn config_role(
    ctx: Context<'_>,
    #[description = "The role to mention when polls are created"] role: serenity::Role,
) -> Result<(), Error> {
    ensure_manage_guild(ctx).await?;
    let update = ConfigUpdate {
        poll_role_id: Some(role.id),
        ..Default::default()
    };
    save(
        ctx,
        update,
        format!("New polls will mention {}.", role.id.mention()),
    )
    .await
}

/// Set the embed color (hex code).
#[poise::command(slash_command, guild_only, rename = "color")]
pub async fn config_color(
    ctx: Context<'_>,
    #[description = "Hex color code (e.g. FF5733, 9B59B6)"]
    #[max_length = 7]
    color: String,
) -> Result<(), Error> {
    ensure_manage_guild(ctx).await?;
    let color = normalize_color(&color)?;
    let update = ConfigUpdate {
        embed_color: Some(color.clone()),
        ..Default::default()
    };
    save(ctx, update, format!("Poll embeds will use #{color}.")).await
}

/// Set default emojis for polls.
#[poise::command(slash_command, guild_only, rename = "emojis")]
pub async fn config_emojis(
    ctx: Context<'_>,
    #[description = "Comma-separated emojis (e.g. 🔥,💯,⭐,❤️)"]
    #[max_length = 200]
    emojis: String,
) -> Result<(), Error> {
    ensure_manage_guild(ctx).await?;
    let emojis = parse_emoji_list(&emojis);
    if emojis.is_empty() {
        return Err(Error::Validation(
            "Invalid emoji format! Separate emojis with commas.".into(),
        ));
    }

    let description = format!("Default poll emojis: {}", emojis.join(" "));
    let update = ConfigUpdate {
        default_emojis: Some(emojis),
        ..Default::default()
    };
    save(ctx, update, description).await
}

/// Set the bot name for this server.
#[poise::command(slash_command, guild_only, rename = "name")]
pub async fn config_name(
    ctx: Context<'_>,
    #[description = "The display name for the bot"]
    #[max_length = 50]
    name: String,
) -> Result<(), Error> {
    ensure_manage_guild(ctx).await?;
    let name = validate_bot_name(&name)?;
    let update = ConfigUpdate {
        bot_name: Some(name.clone()),
        ..Default::default()
    };
    save(ctx, update, format!("Polls will be signed as **{name}**.")).await
}

/// View current poll bot settings.
#[poise::command(slash_command, guild_only, rename = "view")]
pub async fn config_view(ctx: Context<'_>) -> Result<(), Error> {
    ensure_manage_guild(ctx).await?;
    let guild_id = require_guild(ctx)?;
    let settings = server_configs::get_or_create(&ctx.data().db, guild_id).await?;

    ctx.send(
        poise::CreateReply::default()
            .embed(embeds::config_embed(&settings))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

fn require_guild(ctx: Context<'_>) -> Result<serenity::GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| Error::Validation("This command can only be used inside a server.".into()))
}

fn validate_bot_name(raw: &str) -> Result<String, Error> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_BOT_NAME_LEN {
        return Err(Error::Validation(format!(
            "The bot name must be between 1 and {MAX_BOT_NAME_LEN} characters."
        )));
    }
    Ok(name.to_string())
}

/// Persist `update` and confirm to the caller. Permissions are checked by the caller.
async fn save(ctx: Context<'_>, update: ConfigUpdate, description: String) -> Result<(), Error> {
    let guild_id = require_guild(ctx)?;

    server_configs::update(&ctx.data().db, guild_id, update).await?;
    info!(
        guild_id = %guild_id,
        command = %ctx.command().qualified_name,
        user = %ctx.author().name,
        "Poll configuration updated"
    );

    let embed = embeds::success_embed()
        .title("\u{2705} Poll configuration updated")
        .description(description);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
