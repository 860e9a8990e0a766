use crate::{
    domain::{CardId, CardPatch, CardRecord, ColumnId, ColumnRecord, NewCard, NewColumn},
    error::{KanbanError, Result},
    gateway::Gateway,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lists (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    sort_order  REAL NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS cards (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    sort_order  REAL NOT NULL,
    list_id     TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);
";

/// SQLite-backed gateway with `lists` and `cards` tables
pub struct SqliteGateway {
    connection: Mutex<Connection>,
}

impl SqliteGateway {
    /// Opens (or creates) the database at `database_path`
    pub fn new(database_path: &str) -> Result<Self> {
        Self::from_connection(Connection::open(database_path)?)
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| KanbanError::Gateway("sqlite connection lock poisoned".to_string()))
    }
}

fn parse_timestamp(raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
        })
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<ColumnRecord> {
    Ok(ColumnRecord {
        id: ColumnId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        sort_order: row.get(2)?,
        created_at: parse_timestamp(row.get(3)?)?,
    })
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<CardRecord> {
    Ok(CardRecord {
        id: CardId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        sort_order: row.get(2)?,
        list_id: ColumnId::new(row.get::<_, String>(3)?),
        created_at: parse_timestamp(row.get(4)?)?,
    })
}

fn select_card(connection: &Connection, id: &CardId) -> rusqlite::Result<Option<CardRecord>> {
    connection
        .query_row(
            "SELECT id, title, sort_order, list_id, created_at FROM cards WHERE id = ?1",
            params![id.as_str()],
            card_from_row,
        )
        .optional()
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn load_columns(&self) -> Result<Vec<ColumnRecord>> {
        let connection = self.connection()?;
        let mut stmt = connection.prepare("SELECT id, title, sort_order, created_at FROM lists")?;
        let rows = stmt.query_map([], column_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn load_cards(&self) -> Result<Vec<CardRecord>> {
        let connection = self.connection()?;
        let mut stmt =
            connection.prepare("SELECT id, title, sort_order, list_id, created_at FROM cards")?;
        let rows = stmt.query_map([], card_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn create_column(&self, column: &NewColumn) -> Result<Option<ColumnRecord>> {
        let record = ColumnRecord {
            id: ColumnId::new(Uuid::new_v4().to_string()),
            title: column.title.clone(),
            sort_order: column.sort_order,
            created_at: Utc::now(),
        };
        self.connection()?.execute(
            "INSERT INTO lists (id, title, sort_order, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.as_str(),
                record.title,
                record.sort_order,
                record.created_at.to_rfc3339()
            ],
        )?;
        Ok(Some(record))
    }

    async fn create_card(
        &self,
        card: &NewCard,
        column_id: &ColumnId,
    ) -> Result<Option<CardRecord>> {
        let record = CardRecord {
            id: CardId::new(Uuid::new_v4().to_string()),
            title: card.title.clone(),
            sort_order: card.sort_order,
            list_id: column_id.clone(),
            created_at: Utc::now(),
        };
        self.connection()?.execute(
            "INSERT INTO cards (id, title, sort_order, list_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.as_str(),
                record.title,
                record.sort_order,
                record.list_id.as_str(),
                record.created_at.to_rfc3339()
            ],
        )?;
        Ok(Some(record))
    }

    async fn update_card(&self, id: &CardId, patch: &CardPatch) -> Result<Option<CardRecord>> {
        let connection = self.connection()?;
        let Some(mut record) = select_card(&connection, id)? else {
            return Ok(None);
        };
        patch.apply_to(&mut record);
        connection.execute(
            "UPDATE cards SET title = ?2, sort_order = ?3, list_id = ?4 WHERE id = ?1",
            params![
                record.id.as_str(),
                record.title,
                record.sort_order,
                record.list_id.as_str()
            ],
        )?;
        Ok(Some(record))
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        self.connection()?
            .execute("DELETE FROM cards WHERE id = ?1", params![id.as_str()])?;
        Ok(())
    }
}
