use crate::error::Error;
use serenity::all::{ApplicationId, GuildId};

/// Where slash commands get registered on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    /// Register to `GUILD_ID`, or to the first guild seen on ready.
    Development,
    /// Register globally.
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub application_id: Option<ApplicationId>,
    pub guild_id: Option<GuildId>,
    pub deploy_mode: DeployMode,
    pub bot_version: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DISCORD_TOKEN` — Bot token from Discord Developer Portal. In
    ///   development `DEV_DISCORD_TOKEN` takes precedence when set.
    ///
    /// Optional:
    /// - `DATABASE_URL` — SQLite connection string (default "sqlite:data/poll-bot.db")
    /// - `BOT_ENV` — "production" registers commands globally
    /// - `GUILD_ID` — Development guild for command registration
    /// - `APPLICATION_ID` — Application the commands belong to
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let deploy_mode = match non_empty("BOT_ENV") {
            Some(env) if env.trim().eq_ignore_ascii_case("production") => DeployMode::Production,
            _ => DeployMode::Development,
        };

        let discord_token = match deploy_mode {
            DeployMode::Development => {
                non_empty("DEV_DISCORD_TOKEN").or_else(|| non_empty("DISCORD_TOKEN"))
            }
            DeployMode::Production => non_empty("DISCORD_TOKEN"),
        }
        .ok_or_else(|| Error::Config("DISCORD_TOKEN environment variable is required".into()))?;

        let database_url =
            non_empty("DATABASE_URL").unwrap_or_else(|| "sqlite:data/poll-bot.db".into());

        let guild_id = parse_optional_id::<GuildId>("GUILD_ID", non_empty("GUILD_ID"))?;
        let application_id =
            parse_optional_id::<ApplicationId>("APPLICATION_ID", non_empty("APPLICATION_ID"))?;

        Ok(Self {
            discord_token,
            database_url,
            application_id,
            guild_id,
            deploy_mode,
            bot_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

fn parse_optional_id<T>(var: &str, value: Option<String>) -> Result<Option<T>, Error>
where
    T: From<u64>,
{
    match value {
        Some(val) => {
            let id = val
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(|| Error::Config(format!("Invalid ID for {var}: '{val}'")))?;
            Ok(Some(T::from(id)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn token_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_to_development_with_sqlite_file() {
        let config = load(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.deploy_mode, DeployMode::Development);
        assert_eq!(config.database_url, "sqlite:data/poll-bot.db");
        assert!(config.guild_id.is_none());
        assert!(config.application_id.is_none());
    }

    #[test]
    fn dev_token_wins_in_development_only() {
        let dev = load(&[("DISCORD_TOKEN", "prod"), ("DEV_DISCORD_TOKEN", "dev")]).unwrap();
        assert_eq!(dev.discord_token, "dev");

        let prod = load(&[
            ("DISCORD_TOKEN", "prod"),
            ("DEV_DISCORD_TOKEN", "dev"),
            ("BOT_ENV", "production"),
        ])
        .unwrap();
        assert_eq!(prod.discord_token, "prod");
        assert_eq!(prod.deploy_mode, DeployMode::Production);
    }

    #[test]
    fn parses_ids() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("GUILD_ID", " 123456789012345678 "),
            ("APPLICATION_ID", "42"),
        ])
        .unwrap();
        assert_eq!(config.guild_id, Some(GuildId::new(123_456_789_012_345_678)));
        assert_eq!(config.application_id, Some(ApplicationId::new(42)));
    }

    #[test]
    fn rejects_malformed_ids() {
        let err = load(&[("DISCORD_TOKEN", "abc"), ("GUILD_ID", "not-a-number")]).unwrap_err();
        assert!(err.to_string().contains("GUILD_ID"));

        let err = load(&[("DISCORD_TOKEN", "abc"), ("GUILD_ID", "0")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
