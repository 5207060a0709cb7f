use crate::db::server_configs::ServerConfig;
use crate::polls::{PollView, EDIT_BUTTON_ID};
use crate::utils::color::color_or_default;
use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, ReactionType,
};

/// Embed colours used across the bot.
pub struct Colors;

impl Colors {
    pub const POLL: u32 = 0x00AE86;
    pub const ENDED: u32 = 0xFF0000;
    pub const SUCCESS: u32 = 0x00FF7F;
    pub const ERROR: u32 = 0xFF4444;
}

/// Create a success-themed embed (green).
pub fn success_embed() -> CreateEmbed {
    base_embed(Colors::SUCCESS)
}

/// Create an error-themed embed (red).
pub fn error_embed() -> CreateEmbed {
    base_embed(Colors::ERROR)
}

/// Render a poll: question as title, one `<emoji> <option>` line per option.
pub fn poll_embed(view: &PollView) -> CreateEmbed {
    base_embed(view.color)
        .title(&view.title)
        .description(&view.description)
        .footer(CreateEmbedFooter::new(&view.footer))
}

/// The row holding the single "Edit Poll" button attached to every live poll.
pub fn edit_button_row() -> CreateActionRow {
    let button = CreateButton::new(EDIT_BUTTON_ID)
        .label("Edit Poll")
        .style(ButtonStyle::Secondary)
        .emoji(ReactionType::Unicode("\u{270f}\u{fe0f}".into()));

    CreateActionRow::Buttons(vec![button])
}

/// Summary of a server's poll settings for `/pollconfig view`.
pub fn config_embed(settings: &ServerConfig) -> CreateEmbed {
    let channel = settings
        .poll_channel_id
        .map(|id| format!("<#{id}>"))
        .unwrap_or_else(|| "Not set".into());
    let role = settings
        .poll_role_id
        .map(|id| format!("<@&{id}>"))
        .unwrap_or_else(|| "Not set".into());

    base_embed(color_or_default(&settings.embed_color))
        .title("\u{1f4ca} Current Poll Configuration")
        .field("Bot Name", &settings.bot_name, true)
        .field("Poll Channel", channel, true)
        .field("Embed Color", format!("#{}", settings.embed_color), true)
        .field("Default Emojis", settings.default_emojis.join(" "), true)
        .field("Poll Role", role, true)
}

fn base_embed(color: u32) -> CreateEmbed {
    CreateEmbed::default()
        .color(color)
        .timestamp(serenity::model::Timestamp::now())
}
