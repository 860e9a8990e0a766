use crate::domain::{CardForm, CardId, ColumnId};

/// A user command against the board
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a new card. `temp_id` is the placeholder the card carries
    /// until the server assigns its real id.
    CreateCard {
        column_id: ColumnId,
        form: CardForm,
        temp_id: CardId,
    },
    EditCard {
        column_id: ColumnId,
        card_id: CardId,
        form: CardForm,
    },
    DeleteCard {
        column_id: ColumnId,
        card_id: CardId,
    },
    /// Drag-and-drop move, in terms of the indices the drag library reports
    MoveCard {
        source_column_id: ColumnId,
        destination_column_id: ColumnId,
        source_index: usize,
        destination_index: usize,
    },
}

impl Command {
    /// Builds a create command with a freshly generated temporary id
    pub fn create_card(column_id: ColumnId, form: CardForm) -> Self {
        Self::CreateCard {
            column_id,
            form,
            temp_id: CardId::temporary(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateCard { .. } => "create_card",
            Self::EditCard { .. } => "edit_card",
            Self::DeleteCard { .. } => "delete_card",
            Self::MoveCard { .. } => "move_card",
        }
    }
}
