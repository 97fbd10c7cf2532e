//! The collection contract services persist through.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Index declaration for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: String,
    pub order: SortOrder,
    pub unique: bool,
}

impl IndexSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
            unique: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
            unique: false,
        }
    }

    /// Reject writes that would duplicate this field's value.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Sort and limit applied to a `find`.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort: Some((field.into(), order)),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub storage_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// A named container of documents.
///
/// Reads never expose the storage identifier (`_id`). Each call is atomic on
/// its own; nothing spans calls.
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    /// Create the index if it does not exist yet. Fails with
    /// [`DbError::DuplicateKey`] when existing data violates a unique index.
    async fn ensure_index(&self, index: IndexSpec) -> Result<(), DbError>;

    /// Documents matching every field of `filter`, in storage order unless sorted.
    async fn find(&self, filter: &Document, options: FindOptions)
        -> Result<Vec<Document>, DbError>;

    async fn find_one(&self, filter: &Document) -> Result<Option<Document>, DbError> {
        Ok(self
            .find(filter, FindOptions::default().limit(1))
            .await?
            .into_iter()
            .next())
    }

    async fn insert_one(&self, document: Document) -> Result<InsertOutcome, DbError>;

    /// Shallow-merge `set` into the first document matching `filter`.
    async fn update_one(&self, filter: &Document, set: Document)
        -> Result<UpdateOutcome, DbError>;

    async fn delete_one(&self, filter: &Document) -> Result<DeleteOutcome, DbError>;
}
