pub mod board;
pub mod card;
pub mod pending;
pub mod record;
pub mod sorting;

pub use board::{Board, CardMove, Column};
pub use card::{Card, CardForm, CardId, ColumnId};
pub use pending::PendingMap;
pub use record::{CardPatch, CardRecord, ColumnRecord, NewCard, NewColumn};
pub use sorting::{order_between, sort_cards, OrderingConfig};
