//! Open tables: schema, row cursor and binding buffers.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, warn};

use crate::{
    MdbError,
    common::options::OpenOptions,
    storage::{PageId, PageReader, usage_map::read_usage_map},
};

pub mod binding;
pub(crate) mod cell;
pub mod column_def;
pub mod cursor;
pub mod index_def;
pub mod row;
pub mod schema;
pub mod table_def;

pub use binding::{BindTarget, BindingBuffer, Bindings, CapacityExceeded};
pub use column_def::ColumnDef;
pub use cursor::CursorState;
pub use index_def::{IndexDef, IndexKey, IndexKind, SortOrder};
pub use row::Row;
pub use schema::Schema;
pub use table_def::TableDef;

use binding::bind_cell;
use cell::decode_cell;
use cursor::RowCursor;

/// An open table: its definition, a forward-only cursor and one binding
/// buffer per column.
///
/// A table has a single owner; fetching and rewinding take `&mut self`.
/// Call [`Table::close`] when done. Dropping an unclosed table still
/// releases everything, but debug builds log it as a leak.
///
/// # Example
///
/// ```no_run
/// let db = jetsql::Database::open("northwind.mdb")?;
/// let mut orders = db.open_table("Orders")?;
///
/// while orders.fetch_row()? {
///     if let Some(values) = orders.read_row() {
///         println!("{}", values.join(" | "));
///     }
/// }
///
/// orders.close();
/// db.close();
/// # Ok::<(), jetsql::MdbError>(())
/// ```
#[derive(Debug)]
pub struct Table {
    reader: Arc<PageReader>,
    def: TableDef,
    cursor: RowCursor,
    bindings: Bindings,
    date_format: String,
    closed: bool,
}

impl Table {
    /// Loads the definition at `tdef_page` and positions the cursor before
    /// the first row.
    pub(crate) fn open(
        reader: Arc<PageReader>,
        name: &str,
        tdef_page: PageId,
        options: &OpenOptions,
    ) -> Result<Self, MdbError> {
        let def = TableDef::load(&reader, name, tdef_page).map_err(|e| MdbError::table_read(name, e))?;
        let pages = read_usage_map(&reader, def.usage_map).map_err(|e| MdbError::table_read(name, e))?;

        debug!(table = name, data_pages = pages.len(), "opened table");

        Ok(Self {
            cursor: RowCursor::new(def.tdef_page, pages),
            bindings: Bindings::new(def.schema.len(), options.bind_size),
            date_format: options.date_format.clone(),
            def,
            reader,
            closed: false,
        })
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn column_count(&self) -> usize {
        self.def.schema.len()
    }

    /// Row count recorded in the table definition.
    pub fn row_count(&self) -> u32 {
        self.def.num_rows
    }

    /// Column definitions in binding order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.def.schema.columns
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.def.indexes
    }

    pub fn schema(&self) -> &Schema {
        self.def.schema()
    }

    pub fn state(&self) -> &CursorState {
        &self.cursor.state
    }

    /// Decodes only the given column positions from now on. Other
    /// positions read back as empty strings. Out-of-range positions are
    /// ignored.
    pub fn bind_columns(&mut self, positions: &[usize]) {
        self.bindings.bind_only(positions);
    }

    /// Binds every column again.
    pub fn bind_all(&mut self) {
        self.bindings.bind_all();
    }

    /// The binding buffer at a column position.
    pub fn binding(&self, position: usize) -> Option<&BindingBuffer> {
        self.bindings.get(position)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Advances to the next row and decodes it into the bound buffers.
    ///
    /// Returns `false` at the end of the table, and keeps returning `false`
    /// until [`rewind`](Self::rewind); the buffers are cleared on the way.
    /// A value that does not fit its buffer fails with
    /// [`MdbError::BindOverflow`], and so does every later fetch until the
    /// table is rewound.
    pub fn fetch_row(&mut self) -> Result<bool, MdbError> {
        match &self.cursor.state {
            CursorState::Exhausted => return Ok(false),
            CursorState::Failed(err) => return Err(err.clone()),
            CursorState::BeforeFirst | CursorState::Positioned => {}
        }

        match self.decode_next() {
            Ok(true) => {
                self.cursor.state = CursorState::Positioned;
                Ok(true)
            }
            Ok(false) => {
                debug!(table = self.name(), "table exhausted");
                self.bindings.clear();
                self.cursor.state = CursorState::Exhausted;
                Ok(false)
            }
            Err(err) => {
                self.bindings.clear();
                self.cursor.state = CursorState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn decode_next(&mut self) -> Result<bool, MdbError> {
        let name = &self.def.name;
        let Some(row) = self
            .cursor
            .next_row(&self.reader)
            .map_err(|e| MdbError::table_read(name, e))?
        else {
            return Ok(false);
        };

        let fields = self
            .def
            .schema
            .crack_row(&row, self.reader.format())
            .map_err(|e| MdbError::table_read(name, e))?;

        for (j, (column, field)) in self.def.schema.columns.iter().zip(&fields).enumerate() {
            let Some(buffer) = self.bindings.get_mut(j).filter(|b| b.is_bound()) else {
                continue;
            };

            let cell = decode_cell(column, field, &row, &self.reader)
                .map_err(|e| MdbError::table_read(name, e))?;
            bind_cell(buffer, &cell, &self.date_format).map_err(|overflow| {
                MdbError::BindOverflow {
                    column: column.name.clone(),
                    needed: overflow.needed,
                    capacity: overflow.capacity,
                }
            })?;
        }

        Ok(true)
    }

    /// The current row as display strings, in column order.
    ///
    /// `None` unless the last fetch returned `true`.
    pub fn read_row(&self) -> Option<Vec<String>> {
        self.is_positioned()
            .then(|| self.bindings.iter().map(|b| b.as_str().to_owned()).collect())
    }

    /// The current row keyed by column name.
    pub fn read_row_assoc(&self) -> Option<HashMap<String, String>> {
        self.is_positioned().then(|| {
            self.def
                .schema
                .columns
                .iter()
                .zip(self.bindings.iter())
                .map(|(column, buffer)| (column.name.clone(), buffer.as_str().to_owned()))
                .collect()
        })
    }

    /// The current row as typed values.
    pub fn current_row(&self) -> Option<Row> {
        self.is_positioned()
            .then(|| Row::from_bindings(&self.def.schema, &self.bindings))
    }

    fn is_positioned(&self) -> bool {
        matches!(self.cursor.state, CursorState::Positioned)
    }

    /// Moves back before the first row and clears any fetch failure.
    pub fn rewind(&mut self) {
        self.cursor.rewind();
        self.bindings.clear();
    }

    /// Releases the cursor and binding buffers.
    pub fn close(mut self) {
        self.closed = true;
        debug!(table = self.name(), "closed table");
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        if cfg!(debug_assertions) && !self.closed {
            warn!(table = %self.def.name, "table dropped without close()");
        }
    }
}
