use crate::{
    domain::{CardId, CardPatch, CardRecord, ColumnId, ColumnRecord, NewCard, NewColumn},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_gateway;
pub mod memory;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_gateway;

#[cfg(feature = "file-storage")]
pub use file_gateway::FileGateway;
pub use memory::MemoryGateway;

#[cfg(feature = "sqlite-storage")]
pub use sqlite_gateway::SqliteGateway;

/// Persistence gateway for columns and cards
///
/// Create and update return `None` when the backend accepted the call but
/// handed back no row; callers treat that as a failure.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Loads every column
    async fn load_columns(&self) -> Result<Vec<ColumnRecord>>;

    /// Loads every card
    async fn load_cards(&self) -> Result<Vec<CardRecord>>;

    /// Creates a column
    async fn create_column(&self, column: &NewColumn) -> Result<Option<ColumnRecord>>;

    /// Creates a card in the given column and returns the stored row
    async fn create_card(&self, card: &NewCard, column_id: &ColumnId) -> Result<Option<CardRecord>>;

    /// Writes the set fields of `patch` to the card
    async fn update_card(&self, id: &CardId, patch: &CardPatch) -> Result<Option<CardRecord>>;

    /// Deletes a card
    async fn delete_card(&self, id: &CardId) -> Result<()>;
}
