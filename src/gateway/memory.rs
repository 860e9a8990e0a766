use crate::{
    domain::{CardId, CardPatch, CardRecord, ColumnId, ColumnRecord, NewCard, NewColumn},
    error::{KanbanError, Result},
    gateway::Gateway,
};
use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};
use uuid::Uuid;

/// Injected misbehaviour for the next gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The call fails with a gateway error
    Error,
    /// The call succeeds but returns no row. Loads return nothing; a
    /// delete still removes its row.
    Empty,
}

#[derive(Debug, Default)]
struct Tables {
    columns: Vec<ColumnRecord>,
    cards: Vec<CardRecord>,
}

/// In-process gateway holding rows in memory
///
/// Issues server ids the way a database would and can be told to fail or
/// return empty responses, one call at a time.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    faults: Mutex<VecDeque<Fault>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway pre-populated with rows
    pub fn with_records(columns: Vec<ColumnRecord>, cards: Vec<CardRecord>) -> Self {
        Self {
            tables: Mutex::new(Tables { columns, cards }),
            faults: Mutex::new(VecDeque::new()),
        }
    }

    /// Queues a fault for the next call; faults are consumed in order
    pub fn push_fault(&self, fault: Fault) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push_back(fault);
        }
    }

    /// Makes the next `count` calls fail
    pub fn fail_next(&self, count: usize) {
        for _ in 0..count {
            self.push_fault(Fault::Error);
        }
    }

    pub fn columns(&self) -> Vec<ColumnRecord> {
        self.tables().map(|t| t.columns.clone()).unwrap_or_default()
    }

    pub fn cards(&self) -> Vec<CardRecord> {
        self.tables().map(|t| t.cards.clone()).unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| KanbanError::Gateway("memory gateway lock poisoned".to_string()))
    }

    /// Pops the next queued fault, turning `Error` into an `Err`
    fn next_fault(&self, operation: &str) -> Result<Option<Fault>> {
        let fault = self.faults.lock().ok().and_then(|mut faults| faults.pop_front());
        match fault {
            Some(Fault::Error) => Err(KanbanError::Gateway(format!(
                "injected failure in {}",
                operation
            ))),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn load_columns(&self) -> Result<Vec<ColumnRecord>> {
        if self.next_fault("load_columns")? == Some(Fault::Empty) {
            return Ok(Vec::new());
        }
        Ok(self.tables()?.columns.clone())
    }

    async fn load_cards(&self) -> Result<Vec<CardRecord>> {
        if self.next_fault("load_cards")? == Some(Fault::Empty) {
            return Ok(Vec::new());
        }
        Ok(self.tables()?.cards.clone())
    }

    async fn create_column(&self, column: &NewColumn) -> Result<Option<ColumnRecord>> {
        if self.next_fault("create_column")? == Some(Fault::Empty) {
            return Ok(None);
        }
        let record = ColumnRecord {
            id: ColumnId::new(Uuid::new_v4().to_string()),
            title: column.title.clone(),
            sort_order: column.sort_order,
            created_at: Utc::now(),
        };
        self.tables()?.columns.push(record.clone());
        Ok(Some(record))
    }

    async fn create_card(
        &self,
        card: &NewCard,
        column_id: &ColumnId,
    ) -> Result<Option<CardRecord>> {
        if self.next_fault("create_card")? == Some(Fault::Empty) {
            return Ok(None);
        }
        let mut tables = self.tables()?;
        if !tables.columns.iter().any(|col| &col.id == column_id) {
            return Err(KanbanError::Gateway(format!(
                "foreign key violation: list {} does not exist",
                column_id
            )));
        }
        let record = CardRecord {
            id: CardId::new(Uuid::new_v4().to_string()),
            title: card.title.clone(),
            sort_order: card.sort_order,
            list_id: column_id.clone(),
            created_at: Utc::now(),
        };
        tables.cards.push(record.clone());
        Ok(Some(record))
    }

    async fn update_card(&self, id: &CardId, patch: &CardPatch) -> Result<Option<CardRecord>> {
        if self.next_fault("update_card")? == Some(Fault::Empty) {
            return Ok(None);
        }
        let mut tables = self.tables()?;
        let Some(record) = tables.cards.iter_mut().find(|card| &card.id == id) else {
            return Ok(None);
        };
        patch.apply_to(record);
        Ok(Some(record.clone()))
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        // Nothing comes back from a delete, so `Empty` behaves like success
        self.next_fault("delete_card")?;
        self.tables()?.cards.retain(|card| &card.id != id);
        Ok(())
    }
}
