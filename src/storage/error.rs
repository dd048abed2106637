//! Error types for the page layer.

use std::io;

use thiserror::Error;

/// Result type for page-level operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while reading pages and the structures inside them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Requested page lies past the end of the file.
    #[error("page {page} out of range (file has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// A page did not carry the expected type byte.
    #[error("page {page} has type {found:#04x}, expected {expected:#04x}")]
    UnexpectedPageType { page: u32, expected: u8, found: u8 },

    /// A row number is past the page's row-offset table.
    #[error("row {row} not present on page {page} ({row_count} rows)")]
    RowOutOfRange { page: u32, row: u16, row_count: u16 },

    /// Offsets or lengths inside a page do not add up.
    #[error("corrupt page data: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}
