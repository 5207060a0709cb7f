//! Editable polls: the short-lived record kept per posted poll, the store
//! that expires those records, and the create/edit flows built on top.

pub mod messenger;
pub mod service;
pub mod store;

use std::time::Duration;

use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};

use crate::db::server_configs::ServerConfig;
use crate::error::Error;
use crate::utils::color::color_or_default;

pub use messenger::{PollMessenger, SerenityMessenger};
pub use store::{EditSession, ExpiringMap, PollStore};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_OPTION_LEN: usize = 100;

/// Embed titles are capped at 256 characters and the ended title adds
/// `"📊 "` and `" (ENDED)"` around the question.
pub const MAX_QUESTION_LEN: usize = 246;

/// How long a posted poll stays editable.
pub const EDIT_TTL: Duration = Duration::from_secs(15 * 60);

/// How often expired records are swept out of memory.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub const EDIT_BUTTON_ID: &str = "poll:edit";
pub const EDIT_MODAL_ID: &str = "poll:edit_modal";

/// Everything needed to re-render and re-edit a posted poll.
///
/// `options` and `emojis` always have the same length, between
/// [`MIN_OPTIONS`] and [`MAX_OPTIONS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRecord {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub question: String,
    pub options: Vec<String>,
    pub emojis: Vec<String>,
    pub author_id: UserId,
    pub guild_id: GuildId,
}

impl PollRecord {
    pub fn is_author(&self, user: UserId) -> bool {
        self.author_id == user
    }
}

/// Trim options, drop blank ones and enforce the 2–10 bound and the
/// per-option length.
pub fn parse_options<I, S>(raw: I) -> Result<Vec<String>, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let options: Vec<String> = raw
        .into_iter()
        .map(|opt| opt.as_ref().trim().to_string())
        .filter(|opt| !opt.is_empty())
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(Error::validation("Please provide at least 2 poll options!"));
    }
    if options.len() > MAX_OPTIONS {
        return Err(Error::validation("Maximum 10 poll options allowed!"));
    }
    if options
        .iter()
        .any(|opt| opt.chars().count() > MAX_OPTION_LEN)
    {
        return Err(Error::validation(format!(
            "Poll options can be at most {MAX_OPTION_LEN} characters long!"
        )));
    }

    Ok(options)
}

pub fn parse_question(raw: &str) -> Result<String, Error> {
    let question = raw.trim();
    if question.is_empty() {
        return Err(Error::validation("The poll question cannot be empty!"));
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(Error::validation(format!(
            "The poll question can be at most {MAX_QUESTION_LEN} characters long!"
        )));
    }
    Ok(question.to_string())
}

/// Validated input for a poll that has not been rendered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub question: String,
    pub options: Vec<String>,
    pub emojis: Vec<String>,
}

/// Renderable content of a poll message, independent of the platform builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollView {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: String,
    pub mention: Option<RoleId>,
}

impl PollView {
    pub fn new(draft: &PollDraft, settings: &ServerConfig) -> Self {
        let description = draft
            .options
            .iter()
            .zip(&draft.emojis)
            .map(|(option, emoji)| format!("{emoji} {option}\n"))
            .collect();

        Self {
            title: poll_title(&draft.question),
            description,
            color: color_or_default(&settings.embed_color),
            footer: settings.bot_name.clone(),
            mention: settings.poll_role_id,
        }
    }
}

pub fn poll_title(question: &str) -> String {
    format!("\u{1f4ca} {question}")
}

pub fn ended_title(question: &str) -> String {
    format!("\u{1f4ca} {question} (ENDED)")
}


#[cfg(test)]
mod tests {
    use super::test_support::settings;
    use super::*;

    #[test]
    fn options_are_trimmed_and_blank_ones_dropped() {
        let options = parse_options([" A ", "", "  ", "B", "C\t"]).unwrap();
        assert_eq!(options, vec!["A", "B", "C"]);
    }

    #[test]
    fn option_count_is_bounded() {
        assert!(matches!(parse_options(["only"]), Err(Error::Validation(_))));
        assert!(matches!(parse_options(["A", " "]), Err(Error::Validation(_))));

        let ten: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
        assert_eq!(parse_options(&ten).unwrap().len(), 10);

        let eleven: Vec<String> = (1..=11).map(|i| i.to_string()).collect();
        assert!(matches!(parse_options(&eleven), Err(Error::Validation(_))));
    }

    #[test]
    fn blank_question_is_rejected() {
        assert!(parse_question("   ").is_err());
        assert_eq!(parse_question(" Lunch? ").unwrap(), "Lunch?");
    }

    #[test]
    fn longest_question_still_fits_embed_titles() {
        let longest = "q".repeat(MAX_QUESTION_LEN);
        let question = parse_question(&longest).unwrap();
        assert!(poll_title(&question).chars().count() <= 256);
        assert!(ended_title(&question).chars().count() <= 256);

        let too_long = "é".repeat(MAX_QUESTION_LEN + 1);
        assert!(matches!(parse_question(&too_long), Err(Error::Validation(_))));
    }

    #[test]
    fn long_options_are_rejected() {
        let longest = "o".repeat(MAX_OPTION_LEN);
        assert!(parse_options([longest.as_str(), "B"]).is_ok());

        let too_long = "o".repeat(MAX_OPTION_LEN + 1);
        assert!(matches!(
            parse_options([too_long.as_str(), "B"]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn view_pairs_emojis_with_options() {
        let draft = PollDraft {
            question: "Lunch?".into(),
            options: vec!["Pizza".into(), "Sushi".into()],
            emojis: vec!["🍕".into(), "🍣".into()],
        };
        let mut settings = settings();
        settings.bot_name = "Votes".into();
        settings.embed_color = "FF5733".into();
        settings.poll_role_id = Some(RoleId::new(9));

        let view = PollView::new(&draft, &settings);
        assert_eq!(view.title, "📊 Lunch?");
        assert_eq!(view.description, "🍕 Pizza\n🍣 Sushi\n");
        assert_eq!(view.color, 0xFF5733);
        assert_eq!(view.footer, "Votes");
        assert_eq!(view.mention, Some(RoleId::new(9)));
    }

    #[test]
    fn ended_title_marks_poll() {
        assert_eq!(ended_title("Lunch?"), "📊 Lunch? (ENDED)");
    }
}
