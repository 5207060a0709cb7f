use std::sync::Arc;

use poise::serenity_prelude as serenity;
use poll_bot::config::{Config, DeployMode};
use poll_bot::db::{command_registrations, server_configs};
use poll_bot::polls::{PollStore, SWEEP_INTERVAL};
use poll_bot::{commands, events, Data};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poll_bot=info".parse().unwrap()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        version = %config.bot_version,
        mode = ?config.deploy_mode,
        "Starting Poll Bot"
    );

    let db = match poll_bot::db::init_pool(&config.database_url, 5).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            std::process::exit(1);
        }
    };

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let token = config.discord_token.clone();
    let application_id = config.application_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    events::interaction::handle_event(ctx, event, data).await;
                    Ok(())
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            let embed = poll_bot::utils::embeds::error_embed()
                                .title("Error")
                                .description(error.user_message());
                            let _ = ctx
                                .send(poise::CreateReply::default().embed(embed).ephemeral(true))
                                .await;
                            tracing::error!(
                                command = %ctx.command().qualified_name,
                                error = %error,
                                "Command error"
                            );
                        }
                        other => {
                            if let Err(e) = poise::builtins::on_error(other).await {
                                tracing::error!(error = %e, "Error handling error");
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(bot = %ready.user.name, guilds = ready.guilds.len(), "Bot is ready!");

                let command_list = &framework.options().commands;
                let target = match config.deploy_mode {
                    DeployMode::Production => Some(None),
                    DeployMode::Development => config
                        .guild_id
                        .or_else(|| ready.guilds.first().map(|g| g.id))
                        .map(Some),
                };
                match target {
                    Some(guild_id) => {
                        let scope = command_registrations::scope(guild_id);
                        let registered =
                            commands::register_if_changed(ctx, &db, command_list, guild_id)
                                .await?;
                        if registered {
                            info!(scope = %scope, "Slash commands registered");
                        } else {
                            info!(scope = %scope, "Slash commands unchanged, skipping registration");
                        }
                    }
                    None => warn!("No guild available for development command registration"),
                }

                let configured = server_configs::list_all(&db).await?.len();
                info!(configured_servers = configured, "Loaded server configurations");

                let polls = Arc::new(PollStore::new());
                polls.clone().spawn_sweeper(SWEEP_INTERVAL);

                ctx.set_activity(Some(serenity::ActivityData::listening("/poll")));

                Ok(Data { db, polls })
            })
        })
        .build();

    let mut builder = serenity::ClientBuilder::new(token, intents).framework(framework);
    if let Some(application_id) = application_id {
        builder = builder.application_id(application_id);
    }

    let mut client = match builder.await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Discord client");
            std::process::exit(1);
        }
    };

    // Graceful shutdown on SIGINT/SIGTERM
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping bot...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!(error = %why, "Client error");
    }
    info!("Bot has shut down cleanly");
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
