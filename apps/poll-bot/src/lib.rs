pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod polls;
pub mod utils;

use std::sync::Arc;

use sqlx::SqlitePool;

/// Shared data accessible across all Poise commands and event handlers.
pub struct Data {
    pub db: SqlitePool,
    pub polls: Arc<polls::PollStore>,
}

/// Poise context alias used throughout the bot.
pub type Context<'a> = poise::Context<'a, Data, error::Error>;
