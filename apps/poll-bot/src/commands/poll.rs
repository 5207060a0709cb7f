use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::Mentionable;

use crate::db::server_configs;
use crate::polls::service::{self, NewPoll, PollPosted};
use crate::polls::{PollMessenger, SerenityMessenger};
use crate::utils::duration::format_duration;
use crate::Context;

type Error = crate::error::Error;

/// Create a poll with custom options.
#[allow(clippy::too_many_arguments)]
#[poise::command(slash_command, guild_only)]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "The poll question"]
    #[max_length = 246]
    question: String,
    #[description = "First poll option"]
    #[max_length = 100]
    option1: String,
    #[description = "Second poll option"]
    #[max_length = 100]
    option2: String,
    #[description = "Third poll option"]
    #[max_length = 100]
    option3: Option<String>,
    #[description = "Fourth poll option"]
    #[max_length = 100]
    option4: Option<String>,
    #[description = "Fifth poll option"]
    #[max_length = 100]
    option5: Option<String>,
    #[description = "Sixth poll option"]
    #[max_length = 100]
    option6: Option<String>,
    #[description = "Seventh poll option"]
    #[max_length = 100]
    option7: Option<String>,
    #[description = "Eighth poll option"]
    #[max_length = 100]
    option8: Option<String>,
    #[description = "Ninth poll option"]
    #[max_length = 100]
    option9: Option<String>,
    #[description = "Tenth poll option"]
    #[max_length = 100]
    option10: Option<String>,
    #[description = "Custom emojis for options (comma-separated, e.g. 🔥,💯,⭐)"]
    #[max_length = 200]
    emojis: Option<String>,
    #[description = "Channel to post the poll in (default: configured poll channel)"]
    #[channel_types("Text", "News")]
    channel: Option<serenity::GuildChannel>,
    #[description = "Poll duration (e.g. 1h, 30m, 2d)"]
    #[max_length = 50]
    duration: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| Error::Validation("Polls can only be created inside a server.".into()))?;

    ctx.defer_ephemeral().await?;

    let settings = server_configs::get_or_create(&ctx.data().db, guild_id).await?;
    let channel_id = channel
        .map(|c| c.id)
        .or(settings.poll_channel_id)
        .unwrap_or_else(|| ctx.channel_id());

    let options = [
        Some(option1),
        Some(option2),
        option3,
        option4,
        option5,
        option6,
        option7,
        option8,
        option9,
        option10,
    ]
    .into_iter()
    .flatten()
    .collect();

    let messenger: Arc<dyn PollMessenger> =
        Arc::new(SerenityMessenger::new(ctx.serenity_context().http.clone()));

    let posted = service::create_poll(
        &ctx.data().polls,
        messenger,
        &settings,
        NewPoll {
            guild_id,
            channel_id,
            author_id: ctx.author().id,
            question,
            options,
            emojis,
            duration,
        },
    )
    .await?;

    ctx.send(
        poise::CreateReply::default()
            .content(confirmation(&posted))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

fn confirmation(posted: &PollPosted) -> String {
    let mut reply = format!(
        "\u{2705} Poll created in {}!",
        posted.record.channel_id.mention()
    );

    if let Some(duration) = posted.duration {
        reply.push_str(&format!(
            "\n\u{23f0} Duration: {}",
            format_duration(duration)
        ));
    } else if posted.duration_ignored {
        reply.push_str(
            "\n\u{26a0}\u{fe0f} Could not understand the duration, so the poll has no end time.",
        );
    }

    if posted.failed_reactions > 0 {
        reply.push_str(&format!(
            "\n\u{26a0}\u{fe0f} {} reaction(s) could not be added. Check your emojis.",
            posted.failed_reactions
        ));
    }

    reply
}
