use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, GuildId, RoleId};
use sqlx::SqlitePool;

use crate::error::Error;
use crate::utils::emojis::{default_emojis, join_emojis, parse_emoji_list};

pub const DEFAULT_BOT_NAME: &str = "Poll Bot";
pub const DEFAULT_EMBED_COLOR: &str = "00AE86";

const COLUMNS: &str = "guild_id, bot_name, poll_channel_id, embed_color, default_emojis, \
                       poll_role_id, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct ServerConfigRow {
    guild_id: i64,
    bot_name: String,
    poll_channel_id: Option<i64>,
    embed_color: String,
    default_emojis: String,
    poll_role_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Per-guild poll settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub guild_id: GuildId,
    pub bot_name: String,
    pub poll_channel_id: Option<ChannelId>,
    /// Six hex digits, no leading `#`.
    pub embed_color: String,
    pub default_emojis: Vec<String>,
    pub poll_role_id: Option<RoleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial update. `None` keeps the stored value.
///
/// Blank strings and empty emoji lists count as "not provided" too, so a
/// setting can never be cleared through an update.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub bot_name: Option<String>,
    pub poll_channel_id: Option<ChannelId>,
    pub embed_color: Option<String>,
    pub default_emojis: Option<Vec<String>>,
    pub poll_role_id: Option<RoleId>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.bot_name.is_none()
            && self.poll_channel_id.is_none()
            && self.embed_color.is_none()
            && self.default_emojis.is_none()
            && self.poll_role_id.is_none()
    }
}

impl ServerConfig {
    fn merged(self, update: ConfigUpdate) -> Self {
        Self {
            bot_name: update
                .bot_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(self.bot_name),
            poll_channel_id: update.poll_channel_id.or(self.poll_channel_id),
            embed_color: update
                .embed_color
                .filter(|color| !color.trim().is_empty())
                .unwrap_or(self.embed_color),
            default_emojis: update
                .default_emojis
                .filter(|emojis| !emojis.is_empty())
                .unwrap_or(self.default_emojis),
            poll_role_id: update.poll_role_id.or(self.poll_role_id),
            ..self
        }
    }
}

impl From<ServerConfigRow> for ServerConfig {
    fn from(row: ServerConfigRow) -> Self {
        let default_emojis = match parse_emoji_list(&row.default_emojis) {
            emojis if emojis.is_empty() => default_emojis(),
            emojis => emojis,
        };

        Self {
            guild_id: GuildId::new(row.guild_id as u64),
            bot_name: row.bot_name,
            poll_channel_id: row.poll_channel_id.and_then(snowflake).map(ChannelId::new),
            embed_color: row.embed_color,
            default_emojis,
            poll_role_id: row.poll_role_id.and_then(snowflake).map(RoleId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn snowflake(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok().filter(|id| *id != 0)
}

fn to_db_id(id: u64) -> i64 {
    id as i64
}

async fn fetch(pool: &SqlitePool, guild_id: GuildId) -> Result<Option<ServerConfig>, Error> {
    let row = sqlx::query_as::<_, ServerConfigRow>(&format!(
        "SELECT {COLUMNS} FROM server_configs WHERE guild_id = ?1"
    ))
    .bind(to_db_id(guild_id.get()))
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ServerConfig::from))
}

/// Read a guild's settings, inserting the defaults first if the guild has no row yet.
pub async fn get_or_create(pool: &SqlitePool, guild_id: GuildId) -> Result<ServerConfig, Error> {
    if let Some(config) = fetch(pool, guild_id).await? {
        return Ok(config);
    }

    let now = Utc::now();
    sqlx::query(
        "INSERT INTO server_configs (guild_id, bot_name, embed_color, default_emojis, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT (guild_id) DO NOTHING",
    )
    .bind(to_db_id(guild_id.get()))
    .bind(DEFAULT_BOT_NAME)
    .bind(DEFAULT_EMBED_COLOR)
    .bind(join_emojis(&default_emojis()))
    .bind(now)
    .execute(pool)
    .await?;

    tracing::debug!(guild_id = %guild_id, "Created default server config");

    fetch(pool, guild_id)
        .await?
        .ok_or(Error::Database(sqlx::Error::RowNotFound))
}

/// Merge `update` into the guild's settings and persist the result.
///
/// Read and write are separate statements; concurrent updates to one guild
/// are last-write-wins per field.
pub async fn update(
    pool: &SqlitePool,
    guild_id: GuildId,
    update: ConfigUpdate,
) -> Result<ServerConfig, Error> {
    let merged = get_or_create(pool, guild_id).await?.merged(update);

    let row = sqlx::query_as::<_, ServerConfigRow>(&format!(
        "INSERT INTO server_configs
             (guild_id, bot_name, poll_channel_id, embed_color, default_emojis, poll_role_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (guild_id) DO UPDATE SET
             bot_name = excluded.bot_name,
             poll_channel_id = excluded.poll_channel_id,
             embed_color = excluded.embed_color,
             default_emojis = excluded.default_emojis,
             poll_role_id = excluded.poll_role_id,
             updated_at = excluded.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(to_db_id(guild_id.get()))
    .bind(&merged.bot_name)
    .bind(merged.poll_channel_id.map(|id| to_db_id(id.get())))
    .bind(&merged.embed_color)
    .bind(join_emojis(&merged.default_emojis))
    .bind(merged.poll_role_id.map(|id| to_db_id(id.get())))
    .bind(merged.created_at)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Every stored guild config.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ServerConfig>, Error> {
    let rows = sqlx::query_as::<_, ServerConfigRow>(&format!(
        "SELECT {COLUMNS} FROM server_configs ORDER BY guild_id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ServerConfig::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::utils::emojis::DEFAULT_EMOJIS;

    fn guild() -> GuildId {
        GuildId::new(100)
    }

    #[tokio::test]
    async fn first_read_creates_defaults() {
        let pool = test_pool().await;
        let config = get_or_create(&pool, guild()).await.unwrap();

        assert_eq!(config.guild_id, guild());
        assert_eq!(config.bot_name, "Poll Bot");
        assert_eq!(config.embed_color, "00AE86");
        assert_eq!(config.default_emojis.len(), 10);
        assert_eq!(config.default_emojis[0], DEFAULT_EMOJIS[0]);
        assert_eq!(config.default_emojis[9], DEFAULT_EMOJIS[9]);
        assert!(config.poll_channel_id.is_none());
        assert!(config.poll_role_id.is_none());

        assert_eq!(list_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeated_reads_keep_one_row() {
        let pool = test_pool().await;
        let first = get_or_create(&pool, guild()).await.unwrap();
        let second = get_or_create(&pool, guild()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(list_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_merges_provided_fields_only() {
        let pool = test_pool().await;
        update(
            &pool,
            guild(),
            ConfigUpdate {
                bot_name: Some("Votes".into()),
                poll_channel_id: Some(ChannelId::new(555)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let config = update(
            &pool,
            guild(),
            ConfigUpdate {
                embed_color: Some("FF5733".into()),
                poll_role_id: Some(RoleId::new(777)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(config.bot_name, "Votes");
        assert_eq!(config.poll_channel_id, Some(ChannelId::new(555)));
        assert_eq!(config.embed_color, "FF5733");
        assert_eq!(config.poll_role_id, Some(RoleId::new(777)));
        assert_eq!(config.default_emojis.len(), 10);
        assert!(config.updated_at >= config.created_at);
    }

    #[tokio::test]
    async fn update_without_prior_read_creates_row() {
        let pool = test_pool().await;
        let config = update(
            &pool,
            guild(),
            ConfigUpdate {
                default_emojis: Some(vec!["🔥".into(), "💯".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(config.default_emojis, vec!["🔥".to_string(), "💯".to_string()]);
        assert_eq!(fetch(&pool, guild()).await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn blank_values_keep_current_settings() {
        let pool = test_pool().await;
        update(
            &pool,
            guild(),
            ConfigUpdate {
                bot_name: Some("Votes".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let config = update(
            &pool,
            guild(),
            ConfigUpdate {
                bot_name: Some("   ".into()),
                default_emojis: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(config.bot_name, "Votes");
        assert_eq!(config.default_emojis.len(), 10);
    }

    #[tokio::test]
    async fn guilds_are_isolated() {
        let pool = test_pool().await;
        let other = GuildId::new(200);
        update(
            &pool,
            guild(),
            ConfigUpdate {
                bot_name: Some("Votes".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let config = get_or_create(&pool, other).await.unwrap();
        assert_eq!(config.bot_name, DEFAULT_BOT_NAME);
        assert_eq!(list_all(&pool).await.unwrap().len(), 2);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ConfigUpdate::default().is_empty());
        let update = ConfigUpdate {
            poll_role_id: Some(RoleId::new(1)),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
