use std::collections::HashMap;
use std::sync::Arc;

use serenity::all::{
    ActionRow, ActionRowComponent, ComponentInteraction, Context, CreateActionRow,
    CreateInputText, CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal,
    EditInteractionResponse, FullEvent, InputTextStyle, Interaction, ModalInteraction,
};
use tracing::{error, info, warn};

use crate::db::server_configs;
use crate::error::Error;
use crate::polls::service::{self, EditForm};
use crate::polls::{
    PollRecord, SerenityMessenger, EDIT_BUTTON_ID, EDIT_MODAL_ID, MAX_OPTIONS, MAX_OPTION_LEN,
    MAX_QUESTION_LEN,
};
use crate::utils::emojis::join_emojis;
use crate::Data;

const QUESTION_FIELD: &str = "question";
const OPTIONS_FIELD: &str = "options";
const EMOJIS_FIELD: &str = "emojis";

/// Every option at full length, one per line.
const OPTIONS_FIELD_MAX: u16 = (MAX_OPTIONS * (MAX_OPTION_LEN + 1)) as u16;
/// Discord's upper bound for a text input.
const EMOJIS_FIELD_MAX: u16 = 4000;

/// Route component and modal interactions that belong to polls.
///
/// Slash commands are dispatched by poise itself; this only sees the
/// edit button and the edit form.
pub async fn handle_event(ctx: &Context, event: &FullEvent, data: &Data) {
    let FullEvent::InteractionCreate { interaction } = event else {
        return;
    };

    match interaction {
        Interaction::Component(component) if component.data.custom_id == EDIT_BUTTON_ID => {
            if let Err(e) = handle_edit_button(ctx, component, data).await {
                report_component_error(ctx, component, &e).await;
            }
        }
        Interaction::Modal(modal) if modal.data.custom_id == EDIT_MODAL_ID => {
            handle_edit_submit(ctx, modal, data).await;
        }
        _ => {}
    }
}

async fn handle_edit_button(
    ctx: &Context,
    component: &ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let record = service::open_edit(
        &data.polls,
        component.message.id,
        component.channel_id,
        component.user.id,
    )?;

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(edit_modal(&record)))
        .await?;

    info!(
        user = %component.user.name,
        message_id = %record.message_id,
        "Opened poll edit form"
    );
    Ok(())
}

async fn handle_edit_submit(ctx: &Context, modal: &ModalInteraction, data: &Data) {
    if let Err(e) = modal.defer_ephemeral(&ctx.http).await {
        error!(error = %e, "Failed to acknowledge poll edit form");
        return;
    }

    let reply = match apply_edit_submission(ctx, modal, data).await {
        Ok(reply) => reply,
        Err(e) => {
            log_failure(&e, "Poll edit failed");
            format!("\u{274c} {}", e.user_message())
        }
    };

    if let Err(e) = modal
        .edit_response(&ctx.http, EditInteractionResponse::new().content(reply))
        .await
    {
        error!(error = %e, "Failed to reply to poll edit form");
    }
}

async fn apply_edit_submission(
    ctx: &Context,
    modal: &ModalInteraction,
    data: &Data,
) -> Result<String, Error> {
    let guild_id = modal
        .guild_id
        .ok_or_else(|| Error::validation("Polls can only be edited inside a server."))?;
    let submitted_for = modal.message.as_ref().map(|message| message.id);
    service::authorize_edit(&data.polls, modal.user.id, submitted_for)?;

    let settings = server_configs::get_or_create(&data.db, guild_id).await?;

    let values = form_values(&modal.data.components);
    let field = |id: &str| values.get(id).cloned().unwrap_or_default();
    let form = EditForm {
        question: field(QUESTION_FIELD),
        options: field(OPTIONS_FIELD),
        emojis: field(EMOJIS_FIELD),
        message_id: submitted_for,
    };

    let messenger = SerenityMessenger::new(Arc::clone(&ctx.http));
    let edited =
        service::apply_edit(&data.polls, &messenger, &settings, modal.user.id, form).await?;

    let mut reply = String::from("\u{2705} Poll updated successfully!");
    if edited.failed_reactions > 0 {
        reply.push_str(&format!(
            "\n\u{26a0}\u{fe0f} {} reaction(s) could not be added. Check your emojis.",
            edited.failed_reactions
        ));
    }
    Ok(reply)
}

/// The edit form, pre-filled from the stored record.
fn edit_modal(record: &PollRecord) -> CreateModal {
    let question = CreateInputText::new(InputTextStyle::Short, "Poll Question", QUESTION_FIELD)
        .value(&record.question)
        .max_length(MAX_QUESTION_LEN as u16)
        .required(true);

    let options = CreateInputText::new(
        InputTextStyle::Paragraph,
        "Poll Options (one per line)",
        OPTIONS_FIELD,
    )
    .value(record.options.join("\n"))
    .max_length(OPTIONS_FIELD_MAX)
    .required(true);

    let emojis = CreateInputText::new(
        InputTextStyle::Paragraph,
        "Custom Emojis (optional)",
        EMOJIS_FIELD,
    )
    .value(join_emojis(&record.emojis))
    .placeholder("\u{1f525},\u{1f4af},\u{2b50} (comma-separated)")
    .max_length(EMOJIS_FIELD_MAX)
    .required(false);

    CreateModal::new(EDIT_MODAL_ID, "Edit Poll").components(vec![
        CreateActionRow::InputText(question),
        CreateActionRow::InputText(options),
        CreateActionRow::InputText(emojis),
    ])
}

fn form_values(rows: &[ActionRow]) -> HashMap<String, String> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => Some((
                input.custom_id.clone(),
                input.value.clone().unwrap_or_default(),
            )),
            _ => None,
        })
        .collect()
}

async fn report_component_error(ctx: &Context, component: &ComponentInteraction, e: &Error) {
    log_failure(e, "Poll edit button failed");

    let reply = CreateInteractionResponseMessage::new()
        .content(format!("\u{274c} {}", e.user_message()))
        .ephemeral(true);
    if let Err(why) = component
        .create_response(&ctx.http, CreateInteractionResponse::Message(reply))
        .await
    {
        error!(error = %why, "Failed to send interaction error reply");
    }
}

/// Expected rejections are warnings; collaborator failures are errors.
fn log_failure(e: &Error, context: &str) {
    match e {
        Error::Validation(_) | Error::Forbidden(_) | Error::PollNotEditable => {
            warn!(error = %e, "{context}");
        }
        _ => error!(error = %e, "{context}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polls::test_support::record;

    #[test]
    fn modal_is_prefilled_from_record() {
        let modal = edit_modal(&record(1, 7));
        let json = serde_json_value(&modal);

        assert_eq!(json["custom_id"], EDIT_MODAL_ID);
        let rows = json["components"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["components"][0]["custom_id"], QUESTION_FIELD);
        assert_eq!(rows[0]["components"][0]["value"], "Lunch?");
        assert_eq!(rows[1]["components"][0]["value"], "Pizza\nSushi");
    }

    #[test]
    fn longest_poll_fits_the_form() {
        let mut poll = record(1, 7);
        poll.question = "q".repeat(MAX_QUESTION_LEN);
        poll.options = (0..MAX_OPTIONS)
            .map(|i| i.to_string().repeat(MAX_OPTION_LEN))
            .collect();
        poll.emojis = vec!["<:party_parrot:123456789012345678>".to_string(); MAX_OPTIONS];

        let json = serde_json_value(&edit_modal(&poll));
        for row in json["components"].as_array().unwrap() {
            let input = &row["components"][0];
            let value = input["value"].as_str().unwrap();
            let max = input["max_length"].as_u64().unwrap() as usize;
            assert!(
                value.chars().count() <= max,
                "{} is {} chars, limit {max}",
                input["custom_id"],
                value.chars().count()
            );
        }
    }

    fn serde_json_value(modal: &CreateModal) -> serenity::json::Value {
        serenity::json::to_value(modal).unwrap()
    }
}
