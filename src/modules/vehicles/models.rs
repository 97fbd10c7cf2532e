use serde::{Deserialize, Serialize};
use voyage_crud::{FieldKind, IdStrategy, RecordId, Resource, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub model: String,
    pub year: i64,
}

impl Resource for Vehicle {
    const COLLECTION: &'static str = "vehicles";
    const SINGULAR: &'static str = "vehicle";
    const TAG: &'static str = "Vehicles";
    const ID_STRATEGY: IdStrategy = IdStrategy::Sequential;

    fn shape() -> Shape {
        Shape::new("Vehicle")
            .required("model", FieldKind::String)
            .describe("Model name")
            .required("year", FieldKind::Integer)
            .describe("Production year")
    }

    fn id(&self) -> RecordId {
        RecordId::Sequence(self.id)
    }
}
