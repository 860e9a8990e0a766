use crate::{
    domain::{
        card::{Card, CardForm, CardId, ColumnId},
        record::{CardPatch, CardRecord, ColumnRecord},
        sorting::{sort_cards, OrderingConfig},
    },
    error::{KanbanError, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A kanban column and its cards, kept in ascending sort order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub sort_order: f64,
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: ColumnId, title: impl Into<String>, sort_order: f64) -> Self {
        Self {
            id,
            title: title.into(),
            sort_order,
            cards: Vec::new(),
        }
    }

    pub fn from_record(record: &ColumnRecord) -> Self {
        Self::new(record.id.clone(), record.title.clone(), record.sort_order)
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        sort_cards(&mut self.cards);
        self
    }

    pub fn card_index(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == id)
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }

    /// Inserts a card after every card whose sort value is not greater than its own
    fn insert_sorted(&mut self, card: Card) {
        let index = self
            .cards
            .partition_point(|existing| existing.sort_order <= card.sort_order);
        self.cards.insert(index, card);
    }
}

/// Where a card ended up after a drag-and-drop move
#[derive(Debug, Clone, PartialEq)]
pub struct CardMove {
    pub card_id: CardId,
    pub column_id: ColumnId,
    pub sort_order: f64,
}

/// The board: columns in display order, each holding its cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Assembles a board from stored rows
    ///
    /// Columns and cards are ordered by their sort values. Cards that point
    /// at a column the board does not have are dropped.
    pub fn from_records(columns: Vec<ColumnRecord>, cards: Vec<CardRecord>) -> Self {
        let mut by_column: HashMap<ColumnId, Vec<Card>> = HashMap::new();
        for record in cards {
            by_column
                .entry(record.list_id.clone())
                .or_default()
                .push(record.to_card());
        }

        let mut columns: Vec<Column> = columns
            .iter()
            .map(|record| {
                let cards = by_column.remove(&record.id).unwrap_or_default();
                Column::from_record(record).with_cards(cards)
            })
            .collect();
        columns.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));

        for (column_id, orphans) in by_column {
            tracing::warn!(
                column_id = %column_id,
                count = orphans.len(),
                "Dropping cards that reference an unknown column"
            );
        }

        Self { columns }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    fn column_mut(&mut self, id: &ColumnId) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|col| &col.id == id)
            .ok_or_else(|| KanbanError::ColumnNotFound(id.to_string()))
    }

    fn column_position(&self, id: &ColumnId) -> Result<usize> {
        self.columns
            .iter()
            .position(|col| &col.id == id)
            .ok_or_else(|| KanbanError::ColumnNotFound(id.to_string()))
    }

    /// Finds a card anywhere on the board, returning (column index, card index)
    fn locate(&self, id: &CardId) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(col_idx, col)| col.card_index(id).map(|card_idx| (col_idx, card_idx)))
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.locate(id)
            .map(|(col_idx, card_idx)| &self.columns[col_idx].cards[card_idx])
    }

    /// Card displayed at `index` in `column_id`
    pub fn card_at(&self, column_id: &ColumnId, index: usize) -> Option<&Card> {
        self.column(column_id).and_then(|col| col.cards.get(index))
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|col| col.cards.len()).sum()
    }

    /// Appends a card to the end of a column
    pub fn append_card(&mut self, column_id: &ColumnId, card: Card) -> Result<()> {
        self.column_mut(column_id)?.cards.push(card);
        Ok(())
    }

    /// Overwrites a card's editable fields in place
    pub fn edit_card(
        &mut self,
        column_id: &ColumnId,
        card_id: &CardId,
        form: &CardForm,
    ) -> Result<()> {
        let card = self
            .column_mut(column_id)?
            .cards
            .iter_mut()
            .find(|card| &card.id == card_id)
            .ok_or_else(|| KanbanError::CardNotFound(card_id.to_string()))?;
        card.apply_form(form);
        Ok(())
    }

    /// Removes a card from a column and returns it
    pub fn remove_card(&mut self, column_id: &ColumnId, card_id: &CardId) -> Result<Card> {
        let column = self.column_mut(column_id)?;
        let index = column
            .card_index(card_id)
            .ok_or_else(|| KanbanError::CardNotFound(card_id.to_string()))?;
        Ok(column.cards.remove(index))
    }

    /// Replaces the card `id` with `replacement`, keeping its position
    ///
    /// `column_hint` is searched first; if the card is no longer there the
    /// whole board is scanned.
    pub fn replace_card(
        &mut self,
        column_hint: &ColumnId,
        id: &CardId,
        replacement: Card,
    ) -> Result<()> {
        let hinted = self.column_position(column_hint).ok().and_then(|col_idx| {
            self.columns[col_idx]
                .card_index(id)
                .map(|card_idx| (col_idx, card_idx))
        });

        let (col_idx, card_idx) = hinted
            .or_else(|| self.locate(id))
            .ok_or_else(|| KanbanError::CardNotFound(id.to_string()))?;
        self.columns[col_idx].cards[card_idx] = replacement;
        Ok(())
    }

    /// Removes the card `id` from whichever column holds it
    pub fn remove_card_anywhere(&mut self, id: &CardId) -> Result<Card> {
        let (col_idx, card_idx) = self
            .locate(id)
            .ok_or_else(|| KanbanError::CardNotFound(id.to_string()))?;
        Ok(self.columns[col_idx].cards.remove(card_idx))
    }

    /// Moves the card at `source_index` of `source` to `destination_index` of
    /// `destination`
    ///
    /// Indices follow array splice semantics: the card is removed first, then
    /// inserted at `destination_index` of the resulting sequence (clamped to
    /// its length). The moved card gets a new sort value between its new
    /// neighbours. Returns `None` when the card lands where it started.
    pub fn move_card(
        &mut self,
        source: &ColumnId,
        destination: &ColumnId,
        source_index: usize,
        destination_index: usize,
        ordering: &OrderingConfig,
    ) -> Result<Option<CardMove>> {
        let src = self.column_position(source)?;
        let dst = self.column_position(destination)?;

        if source_index >= self.columns[src].cards.len() {
            return Err(KanbanError::CardNotFound(format!("{}[{}]", source, source_index)));
        }
        let mut card = self.columns[src].cards.remove(source_index);

        let cards = &mut self.columns[dst].cards;
        let index = destination_index.min(cards.len());
        if src == dst && index == source_index {
            cards.insert(index, card);
            return Ok(None);
        }

        let previous = index.checked_sub(1).map(|i| cards[i].sort_order);
        let next = cards.get(index).map(|c| c.sort_order);
        card.sort_order = ordering.order_between(previous, next);

        let moved = CardMove {
            card_id: card.id.clone(),
            column_id: destination.clone(),
            sort_order: card.sort_order,
        };
        cards.insert(index, card);
        Ok(Some(moved))
    }

    /// Merges server-confirmed values for the fields a patch wrote
    ///
    /// The card is located by id across all columns. When the patch carried
    /// a position, the card is re-slotted by the confirmed sort value, into
    /// the confirmed column if the board has it.
    pub fn merge_confirmed(
        &mut self,
        id: &CardId,
        patch: &CardPatch,
        record: &CardRecord,
    ) -> Result<()> {
        let (col_idx, card_idx) = self
            .locate(id)
            .ok_or_else(|| KanbanError::CardNotFound(id.to_string()))?;

        if patch.title.is_some() {
            self.columns[col_idx].cards[card_idx].title = record.title.clone();
        }

        if patch.sort_order.is_none() && patch.list_id.is_none() {
            return Ok(());
        }

        let mut card = self.columns[col_idx].cards.remove(card_idx);
        if patch.sort_order.is_some() {
            card.sort_order = record.sort_order;
        }
        let target = match patch.list_id {
            Some(_) => self.column_position(&record.list_id).unwrap_or(col_idx),
            None => col_idx,
        };
        self.columns[target].insert_sorted(card);
        Ok(())
    }
}
