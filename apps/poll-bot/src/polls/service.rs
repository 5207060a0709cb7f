use serenity::all::{ChannelId, GuildId, MessageId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::store::{EditSession, PollStore};
use super::{parse_options, parse_question, PollDraft, PollMessenger, PollRecord, PollView};
use crate::db::server_configs::ServerConfig;
use crate::error::Error;
use crate::utils::duration::parse_duration;
use crate::utils::emojis::{parse_emoji_list, resolve_emojis};

/// A validated-on-use request to post a poll.
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub question: String,
    pub options: Vec<String>,
    pub emojis: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PollPosted {
    pub record: PollRecord,
    pub failed_reactions: usize,
    /// Parsed poll lifetime, if one was requested and understood.
    pub duration: Option<Duration>,
    /// A duration was supplied but contained no usable `<n><unit>` token.
    pub duration_ignored: bool,
}

/// Values submitted through the edit form.
#[derive(Debug, Clone, Default)]
pub struct EditForm {
    pub question: String,
    /// One option per line.
    pub options: String,
    /// Comma-separated, may be blank.
    pub emojis: String,
    /// The poll message the form was opened from, when the platform reports it.
    pub message_id: Option<MessageId>,
}

#[derive(Debug, Clone)]
pub struct PollEdited {
    pub record: PollRecord,
    pub failed_reactions: usize,
}

/// Validate the question and options and pick an emoji for each option.
pub fn build_draft<I, S>(
    question: &str,
    options: I,
    custom_emojis: Option<&str>,
    settings: &ServerConfig,
) -> Result<PollDraft, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let question = parse_question(question)?;
    let options = parse_options(options)?;

    let custom_emojis = custom_emojis.filter(|s| !s.trim().is_empty());
    if let Some(custom) = custom_emojis {
        if parse_emoji_list(custom).is_empty() {
            return Err(Error::validation(
                "Invalid emoji format! Separate emojis with commas.",
            ));
        }
    }

    let emojis = resolve_emojis(custom_emojis, &settings.default_emojis, options.len());

    Ok(PollDraft {
        question,
        options,
        emojis,
    })
}

/// Post a new poll, react with its emojis and make it editable.
///
/// When a duration is given a one-shot task closes the poll after it
/// elapses. That task is not cancelled by later edits and does not survive
/// a restart.
pub async fn create_poll(
    store: &PollStore,
    messenger: Arc<dyn PollMessenger>,
    settings: &ServerConfig,
    request: NewPoll,
) -> Result<PollPosted, Error> {
    let draft = build_draft(
        &request.question,
        &request.options,
        request.emojis.as_deref(),
        settings,
    )?;

    let requested_duration = request
        .duration
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let duration = requested_duration.and_then(parse_duration);

    let view = PollView::new(&draft, settings);
    let message_id = messenger.post_poll(request.channel_id, &view).await?;

    let failed_reactions =
        add_reactions(messenger.as_ref(), request.channel_id, message_id, &draft.emojis).await;

    let record = PollRecord {
        message_id,
        channel_id: request.channel_id,
        question: draft.question,
        options: draft.options,
        emojis: draft.emojis,
        author_id: request.author_id,
        guild_id: request.guild_id,
    };
    store.put(record.clone());

    if let Some(delay) = duration {
        schedule_close(
            messenger,
            request.channel_id,
            message_id,
            record.question.clone(),
            delay,
        );
    }

    info!(
        guild_id = %request.guild_id,
        channel_id = %request.channel_id,
        message_id = %message_id,
        options = record.options.len(),
        "Poll created"
    );

    Ok(PollPosted {
        record,
        failed_reactions,
        duration,
        duration_ignored: requested_duration.is_some() && duration.is_none(),
    })
}

/// Handle a press of a poll's edit button.
///
/// Only the poll's author may edit, and only while the record is alive. On
/// success the requester gets an open edit session for this message and the
/// current record is returned to pre-fill the form.
pub fn open_edit(
    store: &PollStore,
    message_id: MessageId,
    channel_id: ChannelId,
    requester: UserId,
) -> Result<PollRecord, Error> {
    let record = store.get(message_id).ok_or(Error::PollNotEditable)?;
    ensure_author(&record, requester)?;

    store.open_session(
        requester,
        EditSession {
            message_id,
            channel_id,
        },
    );
    Ok(record)
}

/// Check that `requester` may submit an edit form.
///
/// The requester needs an open session whose poll is still stored and
/// authored by them. When `submitted_for` is known it must be the poll the
/// session was opened on. Returns the session and the current record.
pub fn authorize_edit(
    store: &PollStore,
    requester: UserId,
    submitted_for: Option<MessageId>,
) -> Result<(EditSession, PollRecord), Error> {
    let session = store.session(requester).ok_or(Error::PollNotEditable)?;
    if submitted_for.is_some_and(|id| id != session.message_id) {
        warn!(
            requester = %requester,
            session_message_id = %session.message_id,
            "Rejected stale poll edit form"
        );
        return Err(Error::validation(
            "This edit form is out of date. Press Edit Poll on the poll again.",
        ));
    }

    let current = store.get(session.message_id).ok_or(Error::PollNotEditable)?;
    ensure_author(&current, requester)?;
    Ok((session, current))
}

/// Apply a submitted edit form to the poll the requester is editing.
///
/// Everything is validated before the message is touched. Once the message
/// has been updated, reaction failures are counted rather than reverted.
pub async fn apply_edit(
    store: &PollStore,
    messenger: &dyn PollMessenger,
    settings: &ServerConfig,
    requester: UserId,
    form: EditForm,
) -> Result<PollEdited, Error> {
    let (session, current) = authorize_edit(store, requester, form.message_id)?;

    let draft = build_draft(
        &form.question,
        form.options.lines(),
        Some(form.emojis.as_str()),
        settings,
    )?;
    let view = PollView::new(&draft, settings);

    messenger
        .update_poll(session.channel_id, session.message_id, &view)
        .await?;

    if let Err(e) = messenger
        .clear_reactions(session.channel_id, session.message_id)
        .await
    {
        error!(message_id = %session.message_id, error = %e, "Failed to clear poll reactions");
    }

    let failed_reactions = add_reactions(
        messenger,
        session.channel_id,
        session.message_id,
        &draft.emojis,
    )
    .await;

    let record = PollRecord {
        question: draft.question,
        options: draft.options,
        emojis: draft.emojis,
        ..current
    };
    store.put(record.clone());
    store.close_session(requester);

    info!(
        message_id = %record.message_id,
        options = record.options.len(),
        "Poll edited"
    );

    Ok(PollEdited {
        record,
        failed_reactions,
    })
}

fn ensure_author(record: &PollRecord, requester: UserId) -> Result<(), Error> {
    if record.is_author(requester) {
        Ok(())
    } else {
        warn!(
            message_id = %record.message_id,
            requester = %requester,
            "Rejected poll edit from non-author"
        );
        Err(Error::Forbidden(
            "Only the creator of this poll can edit it.".into(),
        ))
    }
}

/// React with each emoji in order. Every attempt is independent; returns
/// how many failed.
async fn add_reactions(
    messenger: &dyn PollMessenger,
    channel_id: ChannelId,
    message_id: MessageId,
    emojis: &[String],
) -> usize {
    let mut failed = 0;
    for (index, emoji) in emojis.iter().enumerate() {
        if let Err(e) = messenger.add_reaction(channel_id, message_id, emoji).await {
            error!(
                message_id = %message_id,
                index,
                emoji = %emoji,
                error = %e,
                "Failed to add reaction"
            );
            failed += 1;
        }
    }
    failed
}

fn schedule_close(
    messenger: Arc<dyn PollMessenger>,
    channel_id: ChannelId,
    message_id: MessageId,
    question: String,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match messenger.close_poll(channel_id, message_id, &question).await {
            Ok(()) => info!(message_id = %message_id, "Poll ended"),
            Err(e) => error!(message_id = %message_id, error = %e, "Error ending poll"),
        }
    })
}
