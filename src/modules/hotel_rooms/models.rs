use serde::{Deserialize, Serialize};
use voyage_crud::{FieldKind, IdStrategy, RecordId, Resource, Shape};

use crate::modules::shared::{Price, Translations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoom {
    pub id: String,
    pub hotel_name: String,
    pub city_id: String,
    pub beds: i64,
    pub label: Translations,
    pub price_per_night: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
}

impl Resource for HotelRoom {
    const COLLECTION: &'static str = "hotel-rooms";
    const SINGULAR: &'static str = "hotelRoom";
    const TAG: &'static str = "Hotel rooms";
    const ID_STRATEGY: IdStrategy = IdStrategy::Random;

    fn shape() -> Shape {
        Shape::new("HotelRoom")
            .required("hotelName", FieldKind::String)
            .required("cityId", FieldKind::String)
            .required("beds", FieldKind::Integer)
            .required("label", FieldKind::Object(Translations::shape()))
            .describe("Room type shown to guests")
            .required("pricePerNight", FieldKind::Object(Price::shape()))
            .optional("amenities", FieldKind::array(FieldKind::String))
    }

    fn id(&self) -> RecordId {
        RecordId::Key(self.id.clone())
    }
}
