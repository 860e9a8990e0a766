use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a card, either server-issued or a client-side placeholder
/// (`tmp-<uuid>`) used until the create call settles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    const TEMPORARY_PREFIX: &'static str = "tmp-";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh client-side placeholder id
    pub fn temporary() -> Self {
        Self(format!("{}{}", Self::TEMPORARY_PREFIX, Uuid::new_v4()))
    }

    /// Returns true if this id was generated on the client and has not yet
    /// been replaced by a server id
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(Self::TEMPORARY_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a column (a "list" on the server side)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A card as held on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub sort_order: f64,
}

impl Card {
    pub fn new(id: CardId, title: impl Into<String>, sort_order: f64) -> Self {
        Self {
            id,
            title: title.into(),
            sort_order,
        }
    }

    /// Overwrites the user-editable fields from a form
    pub fn apply_form(&mut self, form: &CardForm) {
        self.title = form.title.clone();
    }
}

/// User-editable card fields, as captured by the create/edit forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardForm {
    pub title: String,
}

impl CardForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}
