use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the public API.
///
/// Every fallible call returns one of these instead of aborting. Nothing is
/// retried internally: the file is opened read-only and decoding is
/// deterministic, so a failed read fails the same way the second time.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum MdbError {
    /// The file is missing, unreadable, or not a Jet database.
    #[error("cannot open {}: {reason}", path.display())]
    #[diagnostic(code(jetsql::open))]
    Open { path: PathBuf, reason: String },

    /// The system catalog could not be located or parsed.
    #[error("cannot read catalog: {0}")]
    #[diagnostic(code(jetsql::catalog))]
    CatalogRead(String),

    /// No catalog entry matched after a full scan.
    #[error("table not found: {0}")]
    #[diagnostic(code(jetsql::table_not_found))]
    TableNotFound(String),

    /// Column or index metadata, or a data page, is corrupt.
    #[error("cannot read table {table}: {reason}")]
    #[diagnostic(code(jetsql::table_read))]
    TableRead { table: String, reason: String },

    /// A decoded value did not fit its binding buffer. Fatal for the table.
    #[error(
        "value of {needed} bytes for column {column} exceeds the bind buffer capacity of {capacity} bytes"
    )]
    #[diagnostic(
        code(jetsql::bind_overflow),
        help("reopen the database with a larger `bind_size`")
    )]
    BindOverflow {
        column: String,
        needed: usize,
        capacity: usize,
    },

    /// The statement did not parse.
    #[error("syntax error: {0}")]
    #[diagnostic(code(jetsql::query_syntax))]
    QuerySyntax(String),

    /// The statement parsed but could not run: unknown table or column,
    /// type mismatch in the predicate.
    #[error("query failed: {0}")]
    #[diagnostic(code(jetsql::query_execution))]
    QueryExecution(String),
}

impl MdbError {
    pub(crate) fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn table_read(table: &str, source: StorageError) -> Self {
        Self::TableRead {
            table: table.to_owned(),
            reason: source.to_string(),
        }
    }
}
