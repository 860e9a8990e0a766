use crate::{
    domain::{sorting::OrderingConfig, NewColumn},
    error::{KanbanError, Result},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// A column created when the board is found empty on first load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSeed {
    pub title: String,
    pub sort_order: f64,
}

impl ColumnSeed {
    pub fn new(title: impl Into<String>, sort_order: f64) -> Self {
        Self {
            title: title.into(),
            sort_order,
        }
    }

    pub fn to_new_column(&self) -> NewColumn {
        NewColumn {
            title: self.title.clone(),
            sort_order: self.sort_order,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub ordering: OrderingConfig,
    pub default_columns: Vec<ColumnSeed>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingConfig::default(),
            default_columns: vec![
                ColumnSeed::new("To Do", 1000.0),
                ColumnSeed::new("In Progress", 2000.0),
                ColumnSeed::new("Done", 3000.0),
            ],
        }
    }
}

impl StoreConfig {
    /// Parses a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let gap = self.ordering.gap;
        if !gap.is_finite() || gap <= 0.0 {
            return Err(KanbanError::ConfigError(format!(
                "ordering.gap must be a positive finite number, got {}",
                gap
            )));
        }
        if !self.ordering.empty_column_base.is_finite() {
            return Err(KanbanError::ConfigError(
                "ordering.empty_column_base must be finite".to_string(),
            ));
        }
        if let Some(seed) = self.default_columns.iter().find(|seed| !seed.sort_order.is_finite()) {
            return Err(KanbanError::ConfigError(format!(
                "default column '{}' has a non-finite sort_order",
                seed.title
            )));
        }
        Ok(())
    }
}
