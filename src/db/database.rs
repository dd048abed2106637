use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    MdbError,
    catalog::{CatalogEntry, ObjectKind, system_catalog},
    common::options::OpenOptions,
    db::table::{Table, cell::validate_date_format},
    sql::{
        analyzer::{Analyzer, Projection},
        evaluator::{Evaluator, ExpressionEvaluator, PredicateEvaluator},
        parser::{SelectStatement, SqlParser, Statement},
    },
    storage::{JetVersion, PageReader},
};

/// Response from executing a SQL query.
///
/// Column names in output order, and each matching row as display
/// strings in the same order. Null values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponse {
    pub columns: Vec<String>,

    /// The rows returned by the query, in fetch order.
    pub rows: Vec<Vec<String>>,
}

impl QueryResponse {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Each row keyed by column name. When two output columns share a
    /// name, the later one wins.
    pub fn into_records(self) -> Vec<HashMap<String, String>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }
}

/// State shared by catalog scans and query execution, behind the handle's
/// lock.
#[derive(Debug, Default)]
pub(crate) struct DatabaseState {
    /// Last catalog scan, kept only when catalog caching is enabled.
    pub catalog: Option<Vec<CatalogEntry>>,

    /// Display text of the most recent query failure.
    pub last_error: Option<String>,
}

/// An open database file.
///
/// `Database` is the entry point of the crate. It owns the file, lists
/// the catalog, opens tables and runs queries:
/// - [`Database::tables`] lists user tables
/// - [`Database::open_table`] returns a [`Table`] with its own cursor
/// - [`Database::query`] and [`Database::run_query`] execute SQL
///
/// One lock per handle serializes catalog scans and queries. Tables opened
/// from the handle share its file but not its lock.
///
/// Call [`Database::close`] when done; dropping an unclosed handle in a
/// debug build logs a warning.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    reader: Arc<PageReader>,
    options: OpenOptions,
    pub(crate) state: Mutex<DatabaseState>,
    closed: bool,
}

impl Database {
    /// Opens a database with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MdbError> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Opens a database file read-only and validates its header.
    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self, MdbError> {
        let path = path.as_ref();
        validate_date_format(&options.date_format).map_err(|reason| MdbError::open(path, reason))?;
        if options.bind_size == 0 {
            return Err(MdbError::open(path, "bind size must be at least one byte"));
        }

        let reader = PageReader::open(path)?;
        debug!(path = %path.display(), version = %reader.version(), "opened database");

        Ok(Self {
            path: path.to_path_buf(),
            reader: Arc::new(reader),
            options,
            state: Mutex::new(DatabaseState::default()),
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format version of the file.
    pub fn version(&self) -> JetVersion {
        self.reader.version()
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    /// Every catalog entry, system objects included, in storage order.
    pub fn catalog(&self) -> Result<Vec<CatalogEntry>, MdbError> {
        let mut state = self.state.lock();
        self.catalog_locked(&mut state)
    }

    /// Names of the user tables, in storage order.
    pub fn tables(&self) -> Result<Vec<String>, MdbError> {
        let mut state = self.state.lock();
        self.tables_locked(&mut state)
    }

    /// Opens a table by exact (case-sensitive) name.
    ///
    /// System tables such as `MSysObjects` open too; they are only left
    /// out of [`Database::tables`]. Fails with [`MdbError::TableNotFound`]
    /// when no table has that name, before any binding buffer is allocated.
    pub fn open_table(&self, name: &str) -> Result<Table, MdbError> {
        let mut state = self.state.lock();
        self.open_table_locked(&mut state, name)
    }

    /// Drops the cached catalog so the next call re-scans it.
    pub fn invalidate_catalog(&self) {
        self.state.lock().catalog = None;
    }

    /// Runs one SQL statement and returns its rows positionally.
    ///
    /// The whole statement runs under the handle's lock. It first clears
    /// the last-error state, and a failure stores its message there for
    /// [`Database::last_error`]. The steps:
    /// 1. **Parsing** - a syntax error fails with [`MdbError::QuerySyntax`]
    /// 2. **Resolution** - the table comes from the catalog and the column
    ///    names from its schema. An unknown name or a type mismatch fails
    ///    with [`MdbError::QueryExecution`]
    /// 3. **Execution** - only the referenced columns are bound. Every
    ///    fetched row is filtered and projected, then the cursor is rewound
    ///    and the table closed
    pub fn query(&self, sql: &str) -> Result<QueryResponse, MdbError> {
        let mut state = self.state.lock();
        state.last_error = None;

        let result = self.execute_query(&mut state, sql);
        if let Err(err) = &result {
            debug!(error = %err, "query failed");
            state.last_error = Some(err.to_string());
        }
        result
    }

    /// Runs one SQL statement and returns each matching row keyed by
    /// column name.
    ///
    /// # Example
    ///
    /// ```no_run
    /// let db = jetsql::Database::open("northwind.mdb")?;
    /// for record in db.run_query("SELECT * FROM Customers WHERE City = 'Berlin'")? {
    ///     println!("{}", record["CompanyName"]);
    /// }
    /// db.close();
    /// # Ok::<(), jetsql::MdbError>(())
    /// ```
    pub fn run_query(&self, sql: &str) -> Result<Vec<HashMap<String, String>>, MdbError> {
        self.query(sql).map(QueryResponse::into_records)
    }

    /// Whether the most recent query failed.
    pub fn has_error(&self) -> bool {
        self.state.lock().last_error.is_some()
    }

    /// Message of the most recent query failure, if it failed.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Releases the file.
    pub fn close(mut self) {
        self.closed = true;
        debug!(path = %self.path.display(), "closed database");
    }

    pub(crate) fn catalog_locked(
        &self,
        state: &mut DatabaseState,
    ) -> Result<Vec<CatalogEntry>, MdbError> {
        if let Some(entries) = &state.catalog {
            return Ok(entries.clone());
        }

        let entries = system_catalog::scan(&self.reader)?;
        if self.options.cache_catalog {
            state.catalog = Some(entries.clone());
        }
        Ok(entries)
    }

    pub(crate) fn tables_locked(
        &self,
        state: &mut DatabaseState,
    ) -> Result<Vec<String>, MdbError> {
        Ok(self
            .catalog_locked(state)?
            .into_iter()
            .filter(CatalogEntry::is_user_table)
            .map(|entry| entry.name)
            .collect())
    }

    pub(crate) fn open_table_locked(
        &self,
        state: &mut DatabaseState,
        name: &str,
    ) -> Result<Table, MdbError> {
        let entry = self
            .catalog_locked(state)?
            .into_iter()
            .find(|entry| entry.kind == ObjectKind::Table && entry.name == name)
            .ok_or_else(|| MdbError::TableNotFound(name.to_string()))?;

        Table::open(Arc::clone(&self.reader), &entry.name, entry.table_page, &self.options)
    }

    fn execute_query(
        &self,
        state: &mut DatabaseState,
        sql: &str,
    ) -> Result<QueryResponse, MdbError> {
        let statement = SqlParser::new(sql)
            .parse()
            .map_err(|e| MdbError::QuerySyntax(e.to_string()))?;

        match statement {
            Statement::ListTables => Ok(QueryResponse {
                columns: vec!["Tables".to_string()],
                rows: self
                    .tables_locked(state)?
                    .into_iter()
                    .map(|name| vec![name])
                    .collect(),
            }),
            Statement::Describe(name) => {
                let table = self.open_query_table(state, &name)?;
                let rows = table
                    .columns()
                    .iter()
                    .map(|column| {
                        vec![
                            column.name.clone(),
                            column.type_name().to_string(),
                            column.size.to_string(),
                        ]
                    })
                    .collect();
                table.close();

                Ok(QueryResponse {
                    columns: ["Column Name", "Type", "Size"].map(String::from).to_vec(),
                    rows,
                })
            }
            Statement::Select(select) => {
                let mut table = self.open_query_table(state, &select.from_clause.table_name)?;
                let result = execute_select(&mut table, &select);
                table.close();
                result
            }
        }
    }

    /// Opens a table for a query. A missing table is a query failure, not a
    /// lookup failure.
    fn open_query_table(&self, state: &mut DatabaseState, name: &str) -> Result<Table, MdbError> {
        self.open_table_locked(state, name).map_err(|err| match err {
            MdbError::TableNotFound(name) => {
                MdbError::QueryExecution(format!("table {name} does not exist"))
            }
            other => other,
        })
    }
}

fn execute_select(table: &mut Table, select: &SelectStatement) -> Result<QueryResponse, MdbError> {
    let execution = |e: miette::Report| MdbError::QueryExecution(e.to_string());

    let plan = Analyzer::new(table.schema()).analyze(select).map_err(execution)?;
    let referenced = plan.referenced_columns();
    debug!(
        table = %plan.table_name,
        columns = ?referenced,
        filtered = plan.filter.is_some(),
        limit = ?plan.limit,
        "query plan"
    );

    table.bind_columns(&referenced);
    let columns = plan.projections.iter().map(|p| p.name().to_owned()).collect();
    let mut rows = Vec::new();

    while plan.limit.is_none_or(|limit| rows.len() < limit) && table.fetch_row()? {
        let Some(row) = table.current_row() else {
            break;
        };

        if let Some(filter) = &plan.filter
            && !PredicateEvaluator.evaluate(filter, &row).map_err(execution)?
        {
            continue;
        }

        let values = plan
            .projections
            .iter()
            .map(|projection| match projection {
                Projection::Column { index, .. } => Ok(table
                    .binding(*index)
                    .map(|buffer| buffer.as_str().to_owned())
                    .unwrap_or_default()),
                Projection::Computed { expr, .. } => ExpressionEvaluator
                    .evaluate(expr, &row)
                    .map(|value| value.to_string())
                    .map_err(execution),
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(values);
    }

    table.rewind();
    Ok(QueryResponse { columns, rows })
}

impl Drop for Database {
    fn drop(&mut self) {
        if cfg!(debug_assertions) && !self.closed {
            warn!(path = %self.path.display(), "database dropped without close()");
        }
    }
}
