use chrono::Utc;
use serenity::all::GuildId;
use sqlx::SqlitePool;

use crate::error::Error;

/// Registration scope key: `"global"` or `"guild:<id>"`.
pub fn scope(guild_id: Option<GuildId>) -> String {
    match guild_id {
        Some(guild_id) => format!("guild:{guild_id}"),
        None => "global".to_string(),
    }
}

/// Whether `payload` is exactly what was last registered for `scope`.
pub async fn is_current(pool: &SqlitePool, scope: &str, payload: &str) -> Result<bool, Error> {
    let stored: Option<String> =
        sqlx::query_scalar("SELECT payload FROM command_registrations WHERE scope = ?1")
            .bind(scope)
            .fetch_optional(pool)
            .await?;
    Ok(stored.as_deref() == Some(payload))
}

pub async fn record(pool: &SqlitePool, scope: &str, payload: &str) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO command_registrations (scope, payload, registered_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (scope) DO UPDATE SET
             payload = excluded.payload,
             registered_at = excluded.registered_at",
    )
    .bind(scope)
    .bind(payload)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn scopes_are_per_guild() {
        assert_eq!(scope(None), "global");
        assert_eq!(scope(Some(GuildId::new(42))), "guild:42");
    }

    #[tokio::test]
    async fn payload_is_current_only_after_recording() {
        let pool = test_pool().await;
        assert!(!is_current(&pool, "global", "[1]").await.unwrap());

        record(&pool, "global", "[1]").await.unwrap();
        assert!(is_current(&pool, "global", "[1]").await.unwrap());
        assert!(!is_current(&pool, "global", "[2]").await.unwrap());
        assert!(!is_current(&pool, "guild:42", "[1]").await.unwrap());

        record(&pool, "global", "[2]").await.unwrap();
        assert!(is_current(&pool, "global", "[2]").await.unwrap());
    }
}
