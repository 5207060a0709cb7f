#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Discord(#[from] Box<serenity::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Poll is no longer editable")]
    PollNotEditable,
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Error::Discord(Box::new(err))
    }
}

impl Error {
    pub fn user_message(&self) -> &str {
        match self {
            Error::Discord(_) => "Failed to communicate with Discord. Please try again.",
            Error::Config(msg) => msg,
            Error::Database(_) | Error::Migration(_) => {
                "A database error occurred. Please try again later."
            }
            Error::Validation(msg) | Error::Forbidden(msg) => msg,
            Error::PollNotEditable => "Poll data not found. This poll may be too old to edit.",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_shown_verbatim() {
        let err = Error::validation("Please provide at least 2 poll options!");
        assert_eq!(err.user_message(), "Please provide at least 2 poll options!");
    }

    #[test]
    fn collaborator_failures_get_generic_message() {
        let err = Error::Database(sqlx::Error::RowNotFound);
        assert_eq!(
            err.user_message(),
            "A database error occurred. Please try again later."
        );
    }

    #[test]
    fn expired_and_missing_polls_share_one_message() {
        assert!(Error::PollNotEditable.user_message().contains("too old to edit"));
    }
}
