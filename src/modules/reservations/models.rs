use serde::{Deserialize, Serialize};
use voyage_crud::{FieldKind, IdStrategy, RecordId, Resource, Shape};

/// Reference to a product booked alongside the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    /// `hotelRoom` or `flight`.
    pub kind: String,
    pub product_id: String,
}

impl ProductRef {
    pub fn shape() -> Shape {
        Shape::new("ProductRef")
            .required("kind", FieldKind::String)
            .describe("hotelRoom or flight")
            .required("productId", FieldKind::String)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub tour_id: String,
    pub products: Vec<ProductRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource for Reservation {
    const COLLECTION: &'static str = "reservations";
    const SINGULAR: &'static str = "reservation";
    const TAG: &'static str = "Reservations";
    const ID_STRATEGY: IdStrategy = IdStrategy::Random;

    fn shape() -> Shape {
        Shape::new("Reservation")
            .required("userId", FieldKind::String)
            .required("tourId", FieldKind::String)
            .required("products", FieldKind::array(FieldKind::Object(ProductRef::shape())))
            .describe("Complementary products booked with the tour")
            .optional("notes", FieldKind::String)
    }

    fn id(&self) -> RecordId {
        RecordId::Key(self.id.clone())
    }
}
