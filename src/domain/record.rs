use crate::domain::card::{Card, CardId, ColumnId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A column row as stored by the persistence gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub id: ColumnId,
    pub title: String,
    pub sort_order: f64,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewColumn {
    pub title: String,
    pub sort_order: f64,
}

/// A card row as stored by the persistence gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub title: String,
    pub sort_order: f64,
    pub list_id: ColumnId,
    pub created_at: DateTime<Utc>,
}

impl CardRecord {
    /// Strips the row down to what the board holds
    pub fn to_card(&self) -> Card {
        Card::new(self.id.clone(), self.title.clone(), self.sort_order)
    }
}

/// Payload for creating a card. The column goes alongside, as the gateway's
/// `create_card` takes it separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub sort_order: f64,
}

/// Partial card update. Only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ColumnId>,
}

impl CardPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn position(list_id: ColumnId, sort_order: f64) -> Self {
        Self {
            title: None,
            sort_order: Some(sort_order),
            list_id: Some(list_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.sort_order.is_none() && self.list_id.is_none()
    }

    /// Applies the patch to a stored row
    pub fn apply_to(&self, record: &mut CardRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(sort_order) = self.sort_order {
            record.sort_order = sort_order;
        }
        if let Some(list_id) = &self.list_id {
            record.list_id = list_id.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CardRecord {
        CardRecord {
            id: CardId::new("c1"),
            title: "Write docs".to_string(),
            sort_order: 1000.0,
            list_id: ColumnId::new("todo"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut row = record();
        CardPatch::title("Write more docs").apply_to(&mut row);

        assert_eq!(row.title, "Write more docs");
        assert_eq!(row.sort_order, 1000.0);
        assert_eq!(row.list_id.as_str(), "todo");

        CardPatch::position(ColumnId::new("done"), 1500.0).apply_to(&mut row);
        assert_eq!(row.title, "Write more docs");
        assert_eq!(row.sort_order, 1500.0);
        assert_eq!(row.list_id.as_str(), "done");
    }

    #[test]
    fn test_patch_serialization_omits_unset_fields() {
        let json = serde_json::to_string(&CardPatch::title("x")).unwrap();
        assert_eq!(json, r#"{"title":"x"}"#);
        assert!(CardPatch::default().is_empty());
    }
}
