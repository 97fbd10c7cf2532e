//! Generic resource CRUD for Voyage.
//!
//! A [`Resource`] declares its collection, id strategy and [`Shape`]. From
//! that, [`ResourceService`] provides list/get/create/update/remove over a
//! `voyage-db` collection, [`crud_router`] serves them over HTTP, and
//! [`ResourceModule`] plugs the whole thing into the kernel registry.

pub mod error;
pub mod id;
pub mod module;
pub mod resource;
pub mod routes;
pub mod service;
pub mod shape;

#[cfg(test)]
mod testing;

pub use error::CrudError;
pub use id::{IdStrategy, RecordId};
pub use module::ResourceModule;
pub use resource::{Resource, ResourceShapes};
pub use routes::{
    crud_router, crud_table, openapi_fragment, Created, Operation, ResponseDoc, RouteSpec, Success,
};
pub use service::{IdOrRecord, ResourceService};
pub use shape::{Field, FieldKind, Shape, Violation, ViolationKind};
