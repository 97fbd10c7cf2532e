use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::shape::FieldKind;

/// Public record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Sequence(i64),
    Key(String),
}

impl RecordId {
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Sequence(n) => Value::from(*n),
            RecordId::Key(key) => Value::from(key.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Sequence(n) => write!(f, "{n}"),
            RecordId::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Sequence(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Key(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Key(value.to_string())
    }
}

/// How a collection allocates identifiers for new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// Current maximum + 1, starting at 0. Needs a unique index to stay safe
    /// under concurrent creates.
    Sequential,
    /// 128 random bits from the OS CSPRNG, rendered as 32 hex characters.
    Random,
}

impl IdStrategy {
    pub fn field_kind(self) -> FieldKind {
        match self {
            IdStrategy::Sequential => FieldKind::Integer,
            IdStrategy::Random => FieldKind::String,
        }
    }

    /// Interpret a path segment. `None` when it cannot be an id of this kind.
    pub fn parse(self, raw: &str) -> Option<RecordId> {
        match self {
            IdStrategy::Sequential => raw.parse::<i64>().ok().map(RecordId::Sequence),
            IdStrategy::Random if raw.is_empty() => None,
            IdStrategy::Random => Some(RecordId::Key(raw.to_string())),
        }
    }

    /// Identifier following `current_max`; only meaningful for `Sequential`.
    /// `None` once the sequence has reached `i64::MAX`.
    pub fn next_sequence(current_max: Option<i64>) -> Option<RecordId> {
        match current_max {
            None => Some(RecordId::Sequence(0)),
            Some(max) => max.checked_add(1).map(RecordId::Sequence),
        }
    }

    pub fn random_key() -> RecordId {
        RecordId::Key(Uuid::new_v4().simple().to_string())
    }
}
