use serde::{Deserialize, Serialize};
use voyage_crud::{FieldKind, IdStrategy, RecordId, Resource, Shape};

use crate::modules::shared::Price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub code: String,
    pub origin_city_id: String,
    pub destination_city_id: String,
    /// RFC 3339.
    pub departure: String,
    /// RFC 3339.
    pub arrival: String,
    pub price: Price,
    pub seats: i64,
}

impl Resource for Flight {
    const COLLECTION: &'static str = "flights";
    const SINGULAR: &'static str = "flight";
    const TAG: &'static str = "Flights";
    const ID_STRATEGY: IdStrategy = IdStrategy::Random;

    fn shape() -> Shape {
        Shape::new("Flight")
            .required("code", FieldKind::String)
            .describe("Carrier flight number")
            .required("originCityId", FieldKind::String)
            .required("destinationCityId", FieldKind::String)
            .required("departure", FieldKind::String)
            .describe("RFC 3339 timestamp")
            .required("arrival", FieldKind::String)
            .describe("RFC 3339 timestamp")
            .required("price", FieldKind::Object(Price::shape()))
            .required("seats", FieldKind::Integer)
    }

    fn id(&self) -> RecordId {
        RecordId::Key(self.id.clone())
    }
}
