use async_trait::async_trait;
use serenity::all::{
    ChannelId, CreateEmbed, CreateMessage, EditMessage, Http, Mentionable, MessageId,
    ReactionType,
};
use std::sync::Arc;

use super::{ended_title, PollView};
use crate::error::Error;
use crate::utils::embeds::{self, Colors};

/// The messaging-platform calls the poll flows depend on.
#[async_trait]
pub trait PollMessenger: Send + Sync {
    /// Post a new poll message with its edit button.
    async fn post_poll(&self, channel_id: ChannelId, view: &PollView) -> Result<MessageId, Error>;

    /// Replace a poll message's content in place.
    async fn update_poll(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        view: &PollView,
    ) -> Result<(), Error>;

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<(), Error>;

    async fn clear_reactions(&self, channel_id: ChannelId, message_id: MessageId)
        -> Result<(), Error>;

    /// Mark a poll as ended: retitle, recolour and strip its components.
    async fn close_poll(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        question: &str,
    ) -> Result<(), Error>;
}

/// [`PollMessenger`] backed by the Discord HTTP client.
#[derive(Clone)]
pub struct SerenityMessenger {
    http: Arc<Http>,
}

impl SerenityMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn mention_content(view: &PollView) -> String {
    view.mention
        .map(|role| role.mention().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl PollMessenger for SerenityMessenger {
    async fn post_poll(&self, channel_id: ChannelId, view: &PollView) -> Result<MessageId, Error> {
        let message = CreateMessage::new()
            .content(mention_content(view))
            .embed(embeds::poll_embed(view))
            .components(vec![embeds::edit_button_row()]);

        let sent = channel_id.send_message(&self.http, message).await?;
        Ok(sent.id)
    }

    async fn update_poll(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        view: &PollView,
    ) -> Result<(), Error> {
        let edit = EditMessage::new()
            .content(mention_content(view))
            .embed(embeds::poll_embed(view))
            .components(vec![embeds::edit_button_row()]);

        channel_id.edit_message(&self.http, message_id, edit).await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<(), Error> {
        let reaction = ReactionType::try_from(emoji)
            .map_err(|e| Error::validation(format!("Invalid emoji '{emoji}': {e}")))?;

        channel_id
            .create_reaction(&self.http, message_id, reaction)
            .await?;
        Ok(())
    }

    async fn clear_reactions(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), Error> {
        channel_id.delete_reactions(&self.http, message_id).await?;
        Ok(())
    }

    async fn close_poll(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        question: &str,
    ) -> Result<(), Error> {
        let message = channel_id.message(&self.http, message_id).await?;

        let embed = message
            .embeds
            .first()
            .cloned()
            .map(CreateEmbed::from)
            .unwrap_or_default()
            .title(ended_title(question))
            .color(Colors::ENDED);

        let edit = EditMessage::new().embed(embed).components(Vec::new());
        channel_id.edit_message(&self.http, message_id, edit).await?;
        Ok(())
    }
}
