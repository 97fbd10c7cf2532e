use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use uuid::Uuid;

use crate::collection::{
    Collection, DeleteOutcome, FindOptions, IndexSpec, InsertOutcome, SortOrder, UpdateOutcome,
};
use crate::document::{self, Document, STORAGE_ID};
use crate::error::DbError;

/// Collection held in process memory, optionally mirrored to a JSON file.
///
/// When a file is attached, the whole collection is rewritten after every
/// successful write and reloaded by [`MemoryCollection::open`].
pub struct MemoryCollection {
    name: String,
    file: Option<PathBuf>,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            state: RwLock::new(State::default()),
        }
    }

    /// Open a file-backed collection, loading existing documents from `path`.
    pub async fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let name = name.into();
        let path = path.into();

        let documents = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<Document>>(&bytes).map_err(|source| {
                DbError::Corrupt {
                    collection: name.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(DbError::Io { path, source }),
        };

        tracing::debug!(
            collection = %name,
            path = %path.display(),
            documents = documents.len(),
            "opened file-backed collection"
        );

        Ok(Self {
            name,
            file: Some(path),
            state: RwLock::new(State {
                documents,
                indexes: Vec::new(),
            }),
        })
    }

    async fn persist(&self, state: &State) -> Result<(), DbError> {
        let Some(path) = &self.file else {
            return Ok(());
        };

        let bytes = serde_json::to_vec(&state.documents).map_err(|source| DbError::Corrupt {
            collection: self.name.clone(),
            source,
        })?;

        let staging = path.with_extension("json.tmp");
        write_file(&staging, &bytes).await?;
        fs::rename(&staging, path)
            .await
            .map_err(|source| DbError::Io {
                path: path.clone(),
                source,
            })
    }

    /// Reject `candidate` if it collides with another document on a unique index.
    fn check_unique(
        &self,
        state: &State,
        candidate: &Document,
        skip: Option<usize>,
    ) -> Result<(), DbError> {
        for index in state.indexes.iter().filter(|index| index.unique) {
            let Some(value) = candidate.get(&index.field).filter(|v| !v.is_null()) else {
                continue;
            };

            let collides = state
                .documents
                .iter()
                .enumerate()
                .any(|(pos, doc)| Some(pos) != skip && doc.get(&index.field) == Some(value));

            if collides {
                return Err(self.duplicate(&index.field, value));
            }
        }
        Ok(())
    }

    fn duplicate(&self, field: &str, value: &Value) -> DbError {
        DbError::DuplicateKey {
            collection: self.name.clone(),
            field: field.to_string(),
            value: value.clone(),
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), DbError> {
    fs::write(path, bytes).await.map_err(|source| DbError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_index(&self, index: IndexSpec) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        if state.indexes.iter().any(|existing| existing.field == index.field) {
            return Ok(());
        }

        if index.unique {
            let mut seen: Vec<&Value> = Vec::new();
            for value in state
                .documents
                .iter()
                .filter_map(|doc| doc.get(&index.field))
                .filter(|value| !value.is_null())
            {
                if seen.contains(&value) {
                    return Err(self.duplicate(&index.field, value));
                }
                seen.push(value);
            }
        }

        tracing::debug!(
            collection = %self.name,
            field = %index.field,
            unique = index.unique,
            "index ensured"
        );
        state.indexes.push(index);
        Ok(())
    }

    async fn find(
        &self,
        filter: &Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, DbError> {
        let state = self.state.read().await;
        let mut found: Vec<&Document> = state
            .documents
            .iter()
            .filter(|doc| document::matches(doc, filter))
            .collect();

        if let Some((field, order)) = &options.sort {
            found.sort_by(|a, b| {
                let ordering = document::compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(found.into_iter().take(limit).map(document::project).collect())
    }

    async fn insert_one(&self, mut document: Document) -> Result<InsertOutcome, DbError> {
        let mut state = self.state.write().await;
        self.check_unique(&state, &document, None)?;

        let storage_id = Uuid::now_v7().to_string();
        document.insert(STORAGE_ID.to_string(), Value::String(storage_id.clone()));
        state.documents.push(document);

        if let Err(err) = self.persist(&state).await {
            state.documents.pop();
            return Err(err);
        }
        Ok(InsertOutcome { storage_id })
    }

    async fn update_one(
        &self,
        filter: &Document,
        set: Document,
    ) -> Result<UpdateOutcome, DbError> {
        let mut state = self.state.write().await;
        let Some(pos) = state
            .documents
            .iter()
            .position(|doc| document::matches(doc, filter))
        else {
            return Ok(UpdateOutcome {
                matched: 0,
                modified: 0,
            });
        };

        let original = state.documents[pos].clone();
        let mut merged = original.clone();
        for (field, value) in set {
            if field != STORAGE_ID {
                merged.insert(field, value);
            }
        }

        if merged == original {
            return Ok(UpdateOutcome {
                matched: 1,
                modified: 0,
            });
        }

        self.check_unique(&state, &merged, Some(pos))?;
        state.documents[pos] = merged;

        if let Err(err) = self.persist(&state).await {
            state.documents[pos] = original;
            return Err(err);
        }
        Ok(UpdateOutcome {
            matched: 1,
            modified: 1,
        })
    }

    async fn delete_one(&self, filter: &Document) -> Result<DeleteOutcome, DbError> {
        let mut state = self.state.write().await;
        let Some(pos) = state
            .documents
            .iter()
            .position(|doc| document::matches(doc, filter))
        else {
            return Ok(DeleteOutcome { deleted: 0 });
        };

        let removed = state.documents.remove(pos);
        if let Err(err) = self.persist(&state).await {
            state.documents.insert(pos, removed);
            return Err(err);
        }
        Ok(DeleteOutcome { deleted: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::filter;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn reads_never_expose_storage_id() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        let outcome = vehicles
            .insert_one(doc(json!({"id": 0, "model": "Civic"})))
            .await?;
        assert!(!outcome.storage_id.is_empty());

        let all = vehicles.find(&Document::new(), FindOptions::default()).await?;
        assert_eq!(all, vec![doc(json!({"id": 0, "model": "Civic"}))]);

        let one = vehicles.find_one(&filter("id", 0)).await?;
        assert_eq!(one, Some(doc(json!({"id": 0, "model": "Civic"}))));
        Ok(())
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        vehicles
            .ensure_index(IndexSpec::descending("id").unique())
            .await?;
        vehicles.insert_one(doc(json!({"id": 1}))).await?;

        let err = vehicles.insert_one(doc(json!({"id": 1}))).await.unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(
            vehicles.find(&Document::new(), FindOptions::default()).await?.len(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn ensure_index_fails_on_existing_duplicates() -> Result<(), DbError> {
        let tours = MemoryCollection::new("tours");
        tours.insert_one(doc(json!({"id": "a"}))).await?;
        tours.insert_one(doc(json!({"id": "a"}))).await?;

        let err = tours
            .ensure_index(IndexSpec::ascending("id").unique())
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
        Ok(())
    }

    #[tokio::test]
    async fn descending_sort_with_limit_returns_max() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        for id in [3, 11, 7] {
            vehicles.insert_one(doc(json!({ "id": id }))).await?;
        }

        let top = vehicles
            .find(
                &Document::new(),
                FindOptions::sorted("id", SortOrder::Descending).limit(1),
            )
            .await?;
        assert_eq!(top, vec![doc(json!({"id": 11}))]);
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        vehicles
            .insert_one(doc(json!({"id": 0, "model": "Civic", "year": 2020})))
            .await?;

        let outcome = vehicles
            .update_one(&filter("id", 0), doc(json!({"year": 2021})))
            .await?;
        assert_eq!(
            outcome,
            UpdateOutcome {
                matched: 1,
                modified: 1
            }
        );

        let stored = vehicles.find_one(&filter("id", 0)).await?;
        assert_eq!(
            stored,
            Some(doc(json!({"id": 0, "model": "Civic", "year": 2021})))
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_report_unmatched() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        let updated = vehicles
            .update_one(&filter("id", 42), doc(json!({"year": 1999})))
            .await?;
        assert_eq!(updated.matched, 0);

        let deleted = vehicles.delete_one(&filter("id", 42)).await?;
        assert_eq!(deleted.deleted, 0);
        Ok(())
    }

    #[tokio::test]
    async fn update_cannot_overwrite_storage_id() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        vehicles.insert_one(doc(json!({"id": 0}))).await?;
        let outcome = vehicles
            .update_one(&filter("id", 0), doc(json!({"_id": "forged"})))
            .await?;
        assert_eq!(outcome.modified, 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_first_match() -> Result<(), DbError> {
        let vehicles = MemoryCollection::new("vehicles");
        vehicles.insert_one(doc(json!({"id": 0}))).await?;
        vehicles.insert_one(doc(json!({"id": 1}))).await?;

        assert_eq!(vehicles.delete_one(&filter("id", 0)).await?.deleted, 1);
        let rest = vehicles.find(&Document::new(), FindOptions::default()).await?;
        assert_eq!(rest, vec![doc(json!({"id": 1}))]);
        Ok(())
    }

    #[tokio::test]
    async fn file_backed_collection_survives_reopen() -> Result<(), DbError> {
        let path = std::env::temp_dir().join(format!("voyage_collection_{}.json", Uuid::new_v4()));

        let tours = MemoryCollection::open("tours", &path).await?;
        tours.insert_one(doc(json!({"id": "t1", "cityId": "bcn"}))).await?;
        tours.insert_one(doc(json!({"id": "t2", "cityId": "mad"}))).await?;
        tours.delete_one(&filter("id", "t1")).await?;
        drop(tours);

        let reopened = MemoryCollection::open("tours", &path).await?;
        let all = reopened.find(&Document::new(), FindOptions::default()).await?;
        assert_eq!(all, vec![doc(json!({"id": "t2", "cityId": "mad"}))]);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
