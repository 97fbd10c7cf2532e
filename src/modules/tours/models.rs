use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use voyage_crud::{FieldKind, IdStrategy, RecordId, Resource, ResourceShapes, Shape};

use crate::modules::flights::Flight;
use crate::modules::hotel_rooms::HotelRoom;
use crate::modules::shared::{Price, Translations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: String,
    pub name: Translations,
    pub city_id: String,
    /// RFC 3339.
    pub start_date: String,
    pub duration_hours: f64,
    pub price: Price,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Tour {
    /// False when `start_date` does not parse.
    pub fn starts_after(&self, instant: OffsetDateTime) -> bool {
        match OffsetDateTime::parse(&self.start_date, &Rfc3339) {
            Ok(start) => start > instant,
            Err(err) => {
                tracing::debug!(tour_id = %self.id, error = %err, "unparsable tour start date");
                false
            }
        }
    }
}

impl Resource for Tour {
    const COLLECTION: &'static str = "tours";
    const SINGULAR: &'static str = "tour";
    const TAG: &'static str = "Tours";
    const ID_STRATEGY: IdStrategy = IdStrategy::Random;

    fn shape() -> Shape {
        Shape::new("Tour")
            .required("name", FieldKind::Object(Translations::shape()))
            .required("cityId", FieldKind::String)
            .required("startDate", FieldKind::String)
            .describe("RFC 3339 timestamp")
            .required("durationHours", FieldKind::Number)
            .required("price", FieldKind::Object(Price::shape()))
            .required("available", FieldKind::Boolean)
            .optional("tags", FieldKind::array(FieldKind::String))
    }

    fn id(&self) -> RecordId {
        RecordId::Key(self.id.clone())
    }
}

/// A tour with the rooms and flights that fit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRelatedProducts {
    pub tour: Tour,
    pub hotel_rooms: Vec<HotelRoom>,
    pub flights: Vec<Flight>,
}

impl TourRelatedProducts {
    pub fn shape() -> Shape {
        let record = |shapes: ResourceShapes| FieldKind::Object(shapes.record);
        Shape::new("TourRelatedProducts")
            .required("tour", record(ResourceShapes::of::<Tour>()))
            .required("hotelRooms", FieldKind::array(record(ResourceShapes::of::<HotelRoom>())))
            .describe("Rooms in the tour's city")
            .required("flights", FieldKind::array(record(ResourceShapes::of::<Flight>())))
            .describe("Flights landing in the tour's city")
    }
}
