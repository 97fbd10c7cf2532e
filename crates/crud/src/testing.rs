//! Resources and helpers shared by this crate's unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use voyage_db::{Collection, Document, IndexSpec, MemoryCollection};
use voyage_events::{Event, EventBus, EventHandler};

use crate::id::{IdStrategy, RecordId};
use crate::resource::Resource;
use crate::service::ResourceService;
use crate::shape::{FieldKind, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub model: String,
    pub year: i64,
}

impl Resource for Car {
    const COLLECTION: &'static str = "cars";
    const SINGULAR: &'static str = "car";
    const TAG: &'static str = "Cars";
    const ID_STRATEGY: IdStrategy = IdStrategy::Sequential;

    fn shape() -> Shape {
        Shape::new("Car")
            .required("model", FieldKind::String)
            .required("year", FieldKind::Integer)
    }

    fn id(&self) -> RecordId {
        RecordId::Sequence(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fare {
    pub eur: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub holder: String,
    pub price: Fare,
}

impl Resource for Ticket {
    const COLLECTION: &'static str = "tickets";
    const SINGULAR: &'static str = "ticket";
    const TAG: &'static str = "Tickets";
    const ID_STRATEGY: IdStrategy = IdStrategy::Random;

    fn shape() -> Shape {
        Shape::new("Ticket")
            .required("holder", FieldKind::String)
            .required(
                "price",
                FieldKind::Object(
                    Shape::new("Fare")
                        .required("eur", FieldKind::Number)
                        .optional("usd", FieldKind::Number),
                ),
            )
    }

    fn id(&self) -> RecordId {
        RecordId::Key(self.id.clone())
    }
}

/// Row numbers are `u8`, narrower than the shape's `integer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub row: u8,
}

impl Resource for Seat {
    const COLLECTION: &'static str = "seats";
    const SINGULAR: &'static str = "seat";
    const TAG: &'static str = "Seats";
    const ID_STRATEGY: IdStrategy = IdStrategy::Sequential;

    fn shape() -> Shape {
        Shape::new("Seat").required("row", FieldKind::Integer)
    }

    fn id(&self) -> RecordId {
        RecordId::Sequence(self.id)
    }
}

async fn service<R: Resource>() -> (ResourceService<R>, EventBus) {
    let collection = Arc::new(MemoryCollection::new(R::COLLECTION));
    collection
        .ensure_index(IndexSpec::descending("id").unique())
        .await
        .unwrap();
    let events = EventBus::new();
    (ResourceService::new(collection, events.clone(), 32), events)
}

pub async fn cars() -> (ResourceService<Car>, EventBus) {
    service().await
}

pub async fn tickets() -> (ResourceService<Ticket>, EventBus) {
    service().await
}

pub async fn seats() -> (ResourceService<Seat>, EventBus) {
    service().await
}

pub fn car_payload(model: &str, year: i64) -> Document {
    match json!({ "model": model, "year": year }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Forwards every event it receives.
pub struct Recorder(pub mpsc::UnboundedSender<Event>);

#[async_trait]
impl EventHandler for Recorder {
    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        self.0.send(event.clone())?;
        Ok(())
    }
}
