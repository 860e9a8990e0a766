use crate::{
    domain::{CardId, CardPatch, CardRecord, ColumnId, ColumnRecord, NewCard, NewColumn},
    error::{KanbanError, Result},
    gateway::Gateway,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// File-based gateway: one JSON file per column and per card
pub struct FileGateway {
    root_path: PathBuf,
}

impl FileGateway {
    const KANBAN_DIR: &'static str = ".kanban";
    const LISTS_DIR: &'static str = "lists";
    const CARDS_DIR: &'static str = "cards";

    /// Creates a new FileGateway for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    /// Creates the directory layout
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.lists_dir()).await?;
        self.ensure_directory_exists(&self.cards_dir()).await?;
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.lists_dir().exists() && self.cards_dir().exists()
    }

    fn lists_dir(&self) -> PathBuf {
        self.root_path.join(Self::LISTS_DIR)
    }

    fn cards_dir(&self) -> PathBuf {
        self.root_path.join(Self::CARDS_DIR)
    }

    fn column_file(&self, id: &ColumnId) -> PathBuf {
        self.lists_dir().join(format!("{}.json", id.as_str()))
    }

    fn card_file(&self, id: &CardId) -> PathBuf {
        self.cards_dir().join(format!("{}.json", id.as_str()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_record<T: Serialize>(
        &self,
        dir: &Path,
        path: PathBuf,
        record: &T,
    ) -> Result<()> {
        self.ensure_directory_exists(dir).await?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json).await?;
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let contents = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn read_all<T: DeserializeOwned>(&self, dir: &Path) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            records.push(self.read_record(&path).await?);
        }
        Ok(records)
    }
}

#[async_trait]
impl Gateway for FileGateway {
    async fn load_columns(&self) -> Result<Vec<ColumnRecord>> {
        self.read_all(&self.lists_dir()).await
    }

    async fn load_cards(&self) -> Result<Vec<CardRecord>> {
        self.read_all(&self.cards_dir()).await
    }

    async fn create_column(&self, column: &NewColumn) -> Result<Option<ColumnRecord>> {
        let record = ColumnRecord {
            id: ColumnId::new(Uuid::new_v4().to_string()),
            title: column.title.clone(),
            sort_order: column.sort_order,
            created_at: Utc::now(),
        };
        self.write_record(&self.lists_dir(), self.column_file(&record.id), &record)
            .await?;
        Ok(Some(record))
    }

    async fn create_card(
        &self,
        card: &NewCard,
        column_id: &ColumnId,
    ) -> Result<Option<CardRecord>> {
        if !self.column_file(column_id).exists() {
            return Err(KanbanError::Gateway(format!("list {} does not exist", column_id)));
        }

        let record = CardRecord {
            id: CardId::new(Uuid::new_v4().to_string()),
            title: card.title.clone(),
            sort_order: card.sort_order,
            list_id: column_id.clone(),
            created_at: Utc::now(),
        };
        self.write_record(&self.cards_dir(), self.card_file(&record.id), &record)
            .await?;
        Ok(Some(record))
    }

    async fn update_card(&self, id: &CardId, patch: &CardPatch) -> Result<Option<CardRecord>> {
        let file_path = self.card_file(id);
        if !file_path.exists() {
            return Ok(None);
        }

        let mut record: CardRecord = self.read_record(&file_path).await?;
        patch.apply_to(&mut record);
        self.write_record(&self.cards_dir(), file_path, &record).await?;
        Ok(Some(record))
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        let file_path = self.card_file(id);

        if !file_path.exists() {
            return Err(KanbanError::CardNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        Ok(())
    }
}
