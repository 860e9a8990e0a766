use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway returned no record for {operation}")]
    EmptyResponse { operation: &'static str },

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Placeholder id {0} is not temporary or already in use")]
    InvalidPlaceholder(String),

    #[error("Card {0} is still being created")]
    CardNotSaved(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl KanbanError {
    /// True for errors that only mean a command referenced an id the board
    /// cannot act on. These never reach the caller of the store.
    pub fn is_not_found_local(&self) -> bool {
        matches!(
            self,
            Self::CardNotFound(_)
                | Self::ColumnNotFound(_)
                | Self::CardNotSaved(_)
                | Self::InvalidPlaceholder(_)
        )
    }
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for KanbanError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Gateway(err.to_string())
    }
}
