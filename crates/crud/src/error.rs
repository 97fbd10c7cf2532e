use thiserror::Error;
use voyage_db::DbError;
use voyage_http::AppError;

use crate::id::RecordId;
use crate::shape::Violation;

#[derive(Debug, Error)]
pub enum CrudError {
    #[error("{collection} payload failed validation on {} field(s)", .violations.len())]
    Validation {
        collection: &'static str,
        violations: Vec<Violation>,
    },

    #[error("{collection} record {id} not found")]
    NotFound {
        collection: &'static str,
        id: RecordId,
    },

    #[error("'{raw}' is not a valid {collection} identifier")]
    InvalidId {
        collection: &'static str,
        raw: String,
    },

    #[error("no free {collection} identifier after {attempts} attempts")]
    IdentifierExhausted {
        collection: &'static str,
        attempts: u32,
    },

    #[error("stored {collection} record is malformed: {source}")]
    Decode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<CrudError> for AppError {
    fn from(err: CrudError) -> Self {
        match err {
            CrudError::Validation {
                collection,
                violations,
            } => AppError::validation(
                violations.iter().map(|v| v.detail()).collect(),
                format!("invalid {collection} payload"),
            ),
            CrudError::NotFound { .. } => AppError::not_found(err.to_string()),
            CrudError::InvalidId { .. } => AppError::bad_request(err.to_string()),
            CrudError::IdentifierExhausted { attempts, .. } => AppError::conflict(
                vec![serde_json::json!({ "attempts": attempts })],
                err.to_string(),
            ),
            CrudError::Decode { .. } | CrudError::Persistence(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}
