//! Document storage for Voyage resources.
//!
//! Services talk to a [`Collection`]; the [`Database`] hands out one shared
//! collection per name and decides whether it lives only in memory or is
//! mirrored to a JSON file per collection.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use tokio::sync::Mutex;

pub mod collection;
pub mod document;
pub mod error;
pub mod memory;

pub use collection::{
    Collection, DeleteOutcome, FindOptions, IndexSpec, InsertOutcome, SortOrder, UpdateOutcome,
};
pub use document::{Document, STORAGE_ID};
pub use error::DbError;
pub use memory::MemoryCollection;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Storage {
    Memory,
    Files(PathBuf),
}

/// Cloneable handle over all collections of one application.
#[derive(Clone)]
pub struct Database {
    storage: Storage,
    collections: Arc<Mutex<HashMap<String, Arc<MemoryCollection>>>>,
}

impl Database {
    /// Collections that vanish with the process.
    pub fn in_memory() -> Self {
        Self {
            storage: Storage::Memory,
            collections: Arc::default(),
        }
    }

    /// Collections persisted as `{dir}/{name}.json`.
    pub async fn file_backed(dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| DbError::Io {
                path: dir.clone(),
                source,
            })?;

        tracing::info!(target: "voyage-db", dir = %dir.display(), "using file-backed storage");
        Ok(Self {
            storage: Storage::Files(dir),
            collections: Arc::default(),
        })
    }

    /// Get or open the collection called `name`. Repeated calls share one instance.
    pub async fn collection(&self, name: &str) -> Result<Arc<dyn Collection>, DbError> {
        let mut collections = self.collections.lock().await;
        if let Some(existing) = collections.get(name) {
            let shared: Arc<dyn Collection> = existing.clone();
            return Ok(shared);
        }

        let collection = match &self.storage {
            Storage::Memory => MemoryCollection::new(name),
            Storage::Files(dir) => {
                MemoryCollection::open(name, dir.join(format!("{name}.json"))).await?
            }
        };

        let collection = Arc::new(collection);
        collections.insert(name.to_string(), collection.clone());
        let shared: Arc<dyn Collection> = collection;
        Ok(shared)
    }

    /// Names of every collection opened so far, sorted.
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn collections_are_shared_by_name() -> Result<(), DbError> {
        let db = Database::in_memory();
        let first = db.collection("vehicles").await?;
        let second = db.collection("vehicles").await?;

        let mut record = Document::new();
        record.insert("id".into(), json!(0));
        first.insert_one(record).await?;

        assert_eq!(second.find(&Document::new(), FindOptions::default()).await?.len(), 1);
        assert_eq!(db.collection_names().await, vec!["vehicles".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn file_backed_database_writes_one_file_per_collection() -> Result<(), DbError> {
        let dir = std::env::temp_dir().join(format!("voyage_db_{}", uuid::Uuid::new_v4()));
        let db = Database::file_backed(&dir).await?;

        let flights = db.collection("flights").await?;
        let mut record = Document::new();
        record.insert("id".into(), json!("f1"));
        flights.insert_one(record).await?;

        assert!(dir.join("flights.json").exists());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
