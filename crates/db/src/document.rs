//! Document helpers shared by every collection backend.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// A stored record: a flat JSON object.
pub type Document = Map<String, Value>;

/// Field holding the backend-assigned storage identifier. Never returned by reads.
pub const STORAGE_ID: &str = "_id";

/// Build a single-field equality filter.
pub fn filter(field: &str, value: impl Into<Value>) -> Document {
    let mut doc = Document::new();
    doc.insert(field.to_string(), value.into());
    doc
}

/// True when every field of `filter` is present in `doc` with an equal value.
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(field, expected)| doc.get(field) == Some(expected))
}

/// Copy of `doc` without the storage identifier.
pub fn project(doc: &Document) -> Document {
    let mut projected = doc.clone();
    projected.remove(STORAGE_ID);
    projected
}

/// Total order used for sorting: missing/null < bool < number < string < array < object.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn filter_matches_on_every_field() {
        let record = doc(json!({"id": 3, "model": "Civic", "year": 2020}));
        assert!(matches(&record, &filter("id", 3)));
        assert!(matches(&record, &doc(json!({"model": "Civic", "year": 2020}))));
        assert!(!matches(&record, &doc(json!({"model": "Civic", "year": 2021}))));
        assert!(!matches(&record, &filter("color", "red")));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches(&doc(json!({"a": 1})), &Document::new()));
    }

    #[test]
    fn projection_strips_storage_id() {
        let record = doc(json!({"_id": "abc", "id": 1}));
        assert_eq!(project(&record), doc(json!({"id": 1})));
    }

    #[test]
    fn numbers_sort_numerically() {
        let (nine, ten) = (json!(9), json!(10));
        assert_eq!(compare_values(Some(&nine), Some(&ten)), Ordering::Less);
        assert_eq!(compare_values(None, Some(&nine)), Ordering::Less);
        let (a, b) = (json!("a"), json!(1.5));
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Greater);
    }
}
