//! Sub-records embedded in several resources.

use serde::{Deserialize, Serialize};
use voyage_crud::{FieldKind, Shape};

/// Amount per currency. EUR is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub eur: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gbp: Option<f64>,
}

impl Price {
    pub fn shape() -> Shape {
        Shape::new("Price")
            .required("eur", FieldKind::Number)
            .optional("usd", FieldKind::Number)
            .optional("gbp", FieldKind::Number)
    }
}

/// Display text per language. English is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translations {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
}

impl Translations {
    pub fn shape() -> Shape {
        Shape::new("Translations")
            .required("en", FieldKind::String)
            .optional("es", FieldKind::String)
            .optional("fr", FieldKind::String)
    }
}
