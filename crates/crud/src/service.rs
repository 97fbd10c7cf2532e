use std::{marker::PhantomData, sync::Arc};

use serde_json::Value;
use voyage_db::{document, Collection, DbError, Document, FindOptions, SortOrder};
use voyage_events::EventBus;

use crate::error::CrudError;
use crate::id::{IdStrategy, RecordId};
use crate::resource::{Resource, ResourceShapes};
use crate::shape::{Violation, ViolationKind};

/// Target of a removal: a bare id or a record carrying one.
#[derive(Debug, Clone)]
pub enum IdOrRecord<R> {
    Id(RecordId),
    Record(R),
}

impl<R: Resource> IdOrRecord<R> {
    pub fn into_id(self) -> RecordId {
        match self {
            IdOrRecord::Id(id) => id,
            IdOrRecord::Record(record) => record.id(),
        }
    }
}

impl<R> From<RecordId> for IdOrRecord<R> {
    fn from(id: RecordId) -> Self {
        IdOrRecord::Id(id)
    }
}

/// CRUD over one collection.
///
/// Holds no record state between calls; the collection owns every record.
pub struct ResourceService<R> {
    collection: Arc<dyn Collection>,
    events: EventBus,
    shapes: ResourceShapes,
    id_retry_limit: u32,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceService<R> {
    pub fn new(collection: Arc<dyn Collection>, events: EventBus, id_retry_limit: u32) -> Self {
        Self {
            collection,
            events,
            shapes: ResourceShapes::of::<R>(),
            id_retry_limit: id_retry_limit.max(1),
            _resource: PhantomData,
        }
    }

    pub fn shapes(&self) -> &ResourceShapes {
        &self.shapes
    }

    pub fn parse_id(&self, raw: &str) -> Result<RecordId, CrudError> {
        R::ID_STRATEGY
            .parse(raw)
            .ok_or_else(|| CrudError::InvalidId {
                collection: R::COLLECTION,
                raw: raw.to_string(),
            })
    }

    /// Every record, in storage order.
    pub async fn list(&self) -> Result<Vec<R>, CrudError> {
        let documents = self
            .collection
            .find(&Document::new(), FindOptions::default())
            .await?;
        documents.into_iter().map(decode::<R>).collect()
    }

    pub async fn get(&self, id: &RecordId) -> Result<R, CrudError> {
        match self.collection.find_one(&id_filter(id)).await? {
            Some(found) => decode(found),
            None => Err(CrudError::NotFound {
                collection: R::COLLECTION,
                id: id.clone(),
            }),
        }
    }

    /// Records whose top-level `field` equals `value`.
    pub async fn find_by(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<R>, CrudError> {
        let documents = self
            .collection
            .find(&document::filter(field, value), FindOptions::default())
            .await?;
        documents.into_iter().map(decode::<R>).collect()
    }

    /// Assign an id, validate the whole record, insert it and announce it.
    ///
    /// Losing an identifier race (duplicate `id` on insert) restarts from id
    /// allocation, up to the configured retry limit. Nothing is written when
    /// validation fails.
    pub async fn create(&self, payload: Document) -> Result<R, CrudError> {
        for attempt in 1..=self.id_retry_limit {
            let id = self.next_id(attempt).await?;

            let mut record = payload.clone();
            record.insert("id".to_string(), id.to_value());
            let created = self.admit(&record)?;

            match self.collection.insert_one(record.clone()).await {
                Ok(_) => {
                    tracing::info!(collection = R::COLLECTION, id = %id, "record created");
                    let listeners = self
                        .events
                        .emit(&R::created_event(), Value::Object(record))
                        .await;
                    tracing::debug!(
                        collection = R::COLLECTION,
                        id = %id,
                        listeners,
                        "created event emitted"
                    );
                    return Ok(created);
                }
                Err(DbError::DuplicateKey { ref field, .. }) if field == "id" => {
                    tracing::debug!(
                        collection = R::COLLECTION,
                        id = %id,
                        attempt,
                        "identifier already taken, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!(
            collection = R::COLLECTION,
            attempts = self.id_retry_limit,
            "gave up allocating an identifier"
        );
        Err(CrudError::IdentifierExhausted {
            collection: R::COLLECTION,
            attempts: self.id_retry_limit,
        })
    }

    /// Overwrite only the fields present in `patch`. Succeeds even when no
    /// record has this id.
    ///
    /// The patched record must still be a valid `R`; otherwise nothing is
    /// written and the call fails with `Validation`.
    pub async fn update(&self, id: &RecordId, mut patch: Document) -> Result<(), CrudError> {
        patch.remove("id");
        tracing::debug!(
            collection = R::COLLECTION,
            id = %id,
            fields = patch.len(),
            "updating record"
        );

        if patch.is_empty() {
            return Ok(());
        }

        let filter = id_filter(id);
        let Some(mut merged) = self.collection.find_one(&filter).await? else {
            tracing::debug!(collection = R::COLLECTION, id = %id, "update matched no record");
            return Ok(());
        };
        merged.extend(patch.clone());
        self.admit(&merged)?;

        let outcome = self.collection.update_one(&filter, patch).await?;
        if outcome.matched == 0 {
            tracing::debug!(collection = R::COLLECTION, id = %id, "record vanished before update");
        }
        Ok(())
    }

    /// Delete by id or by record. Succeeds even when nothing matched.
    pub async fn remove(&self, target: impl Into<IdOrRecord<R>>) -> Result<(), CrudError> {
        let id = target.into().into_id();
        tracing::debug!(collection = R::COLLECTION, id = %id, "removing record");

        let outcome = self.collection.delete_one(&id_filter(&id)).await?;
        if outcome.deleted == 0 {
            tracing::debug!(collection = R::COLLECTION, id = %id, "remove matched no record");
        }
        Ok(())
    }

    async fn next_id(&self, attempt: u32) -> Result<RecordId, CrudError> {
        match R::ID_STRATEGY {
            IdStrategy::Random => Ok(IdStrategy::random_key()),
            IdStrategy::Sequential => {
                let top = self
                    .collection
                    .find(
                        &Document::new(),
                        FindOptions::sorted("id", SortOrder::Descending).limit(1),
                    )
                    .await?;
                let current = top
                    .first()
                    .and_then(|record| record.get("id"))
                    .and_then(Value::as_i64);
                IdStrategy::next_sequence(current).ok_or(CrudError::IdentifierExhausted {
                    collection: R::COLLECTION,
                    attempts: attempt,
                })
            }
        }
    }

    /// Check a full record against the record shape and the Rust type.
    fn admit(&self, record: &Document) -> Result<R, CrudError> {
        self.shapes
            .record
            .validate_document(record)
            .map_err(|violations| CrudError::Validation {
                collection: R::COLLECTION,
                violations,
            })?;

        serde_path_to_error::deserialize(Value::Object(record.clone())).map_err(|err| {
            let field = match err.path().to_string() {
                path if path == "." => "$".to_string(),
                path => path,
            };
            CrudError::Validation {
                collection: R::COLLECTION,
                violations: vec![Violation {
                    field,
                    kind: ViolationKind::Rejected(err.into_inner().to_string()),
                }],
            }
        })
    }
}

fn id_filter(id: &RecordId) -> Document {
    document::filter("id", id.to_value())
}

fn decode<R: Resource>(document: Document) -> Result<R, CrudError> {
    serde_json::from_value(Value::Object(document)).map_err(|source| CrudError::Decode {
        collection: R::COLLECTION,
        source,
    })
}
