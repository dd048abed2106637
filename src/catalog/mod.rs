//! The system catalog: the in-file directory of tables and other objects.

pub mod system_catalog;

pub use system_catalog::{CatalogEntry, ObjectKind};
