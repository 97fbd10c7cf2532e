use serde::{de::DeserializeOwned, Serialize};

use crate::id::{IdStrategy, RecordId};
use crate::shape::{Field, Shape};

/// A record family served by a [`ResourceService`](crate::ResourceService).
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also the URL segment (`/api/{COLLECTION}`).
    const COLLECTION: &'static str;
    /// camelCase singular, used for event names (`vehicleCreated`).
    const SINGULAR: &'static str;
    /// OpenAPI tag.
    const TAG: &'static str;
    const ID_STRATEGY: IdStrategy;

    /// Fields a client supplies, i.e. everything but `id`.
    fn shape() -> Shape;

    fn id(&self) -> RecordId;

    fn created_event() -> String {
        format!("{}Created", Self::SINGULAR)
    }
}

/// The three shapes every resource exposes.
#[derive(Debug, Clone)]
pub struct ResourceShapes {
    /// Stored record, `id` included.
    pub record: Shape,
    /// POST body.
    pub create: Shape,
    /// PATCH body.
    pub update: Shape,
}

impl ResourceShapes {
    pub fn of<R: Resource>() -> Self {
        let base = R::shape();
        let id = Field {
            name: "id",
            kind: R::ID_STRATEGY.field_kind(),
            required: true,
            description: Some("Server-assigned identifier"),
        };

        Self {
            record: base.prepend(base.name().to_string(), id),
            create: base.renamed(format!("New{}", base.name())),
            update: base.partial(format!("Update{}", base.name())),
        }
    }
}
