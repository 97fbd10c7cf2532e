//! Module lifecycle and configuration shared by every Voyage crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{CollectionIndex, InitCtx, Module};
pub use registry::ModuleRegistry;
pub use settings::Settings;
