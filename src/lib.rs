//! Read-only access to Jet (Microsoft Access `.mdb`/`.accdb`) database
//! files, with a small SQL engine on top.
//!
//! [`Database`] lists the catalog and opens tables. A [`Table`] walks its
//! rows with a forward-only cursor that decodes each value into a binding
//! buffer as display text. [`Database::run_query`] runs a single-table
//! `SELECT ... FROM ... WHERE ...` over the same cursor.
//!
//! ```no_run
//! use jetsql::{Database, OpenOptions};
//!
//! let db = Database::open_with("northwind.mdb", OpenOptions::new().date_format("%d/%m/%Y"))?;
//! for name in db.tables()? {
//!     let table = db.open_table(&name)?;
//!     println!("{name}: {} rows", table.row_count());
//!     table.close();
//! }
//! db.close();
//! # Ok::<(), jetsql::MdbError>(())
//! ```

pub(crate) mod catalog;
pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod sql;
pub(crate) mod storage;

#[cfg(test)]
mod fixture;

pub use catalog::{CatalogEntry, ObjectKind};
pub use common::{
    error::MdbError,
    options::{DEFAULT_BIND_SIZE, DEFAULT_DATE_FORMAT, OpenOptions},
};
pub use crate::core::types::{ColumnType, DataType, Value, type_name};
pub use db::{
    database::{Database, QueryResponse},
    table::*,
};
pub use storage::JetVersion;
