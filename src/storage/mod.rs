//! Read-only page layer for Jet database files.
//!
//! Everything above this module works in terms of pages, rows inside data
//! pages, usage maps and long values; only this module knows how those are
//! laid out on disk.

pub mod error;
pub mod format;
pub mod long_value;
pub mod page;
pub mod text;
pub mod usage_map;

pub use error::{StorageError, StorageResult};
pub use format::{JetFormat, JetVersion};
pub use page::{Page, PageId, PageReader, RowPointer};
