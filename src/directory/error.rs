#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    /// Another user already holds this id or email.
    #[error("A user with that {field} already exists")]
    Duplicate { field: &'static str },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<tokio_rusqlite::Error> for DirectoryError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        Self::Backend(err.into())
    }
}
