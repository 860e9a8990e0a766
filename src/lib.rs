//! # Kanban Board Core
//!
//! Board state store for a kanban board backed by a remote store.
//!
//! Commands (create, edit, delete, move a card) are applied to the
//! in-memory board immediately and mirrored to a [`Gateway`] afterwards.
//! When a call completes, its outcome is reconciled against the board as it
//! is by then: created cards swap their temporary id for the server's,
//! failed creates disappear, and the card's pending flag is cleared.
//!
//! Card positions use fractional sort values, so a move rewrites a single
//! card rather than renumbering its column.

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod store;

// Re-export commonly used types
pub use config::{ColumnSeed, StoreConfig};
pub use domain::{
    board::{Board, Column},
    card::{Card, CardForm, CardId, ColumnId},
    pending::PendingMap,
    sorting::OrderingConfig,
};
pub use error::{KanbanError, Result};
pub use gateway::{Gateway, MemoryGateway};
pub use store::{BoardState, BoardStore, Command, Outcome, PersistenceCall};
