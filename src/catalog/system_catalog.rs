use strum::{Display, FromRepr};
use tracing::debug;

use crate::{
    MdbError,
    db::table::{
        TableDef,
        cell::{Cell, decode_cell},
        cursor::RowCursor,
    },
    storage::{PageId, PageReader, StorageError, format::CATALOG_TDEF_PAGE, usage_map::read_usage_map},
};

/// Name of the catalog table.
pub const CATALOG_TABLE: &str = "MSysObjects";

/// Names starting with this are reserved for the engine.
pub const SYSTEM_PREFIX: &str = "MSys";

const TYPE_MASK: i64 = 0x7F;
const TABLE_PAGE_MASK: i64 = 0x00FF_FFFF;

/// Kind of a catalog object, from the low bits of its `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum ObjectKind {
    Form = 0,
    Table = 1,
    Macro = 2,
    SystemTable = 3,
    Report = 4,
    Query = 5,
    LinkedTable = 6,
    Module = 7,
    Relationship = 8,
    DatabaseProperty = 11,
    Other = 0xFF,
}

impl ObjectKind {
    fn from_type(raw: i64) -> Self {
        Self::from_repr((raw & TYPE_MASK) as u8).unwrap_or(Self::Other)
    }
}

/// One row of the system catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: ObjectKind,
    /// First table-definition page, for tables.
    pub table_page: PageId,
    pub flags: u32,
}

impl CatalogEntry {
    /// Whether the name is in the reserved `MSys` namespace.
    pub fn is_system(&self) -> bool {
        self.name.starts_with(SYSTEM_PREFIX)
    }

    /// A table a user can open by name.
    pub fn is_user_table(&self) -> bool {
        self.kind == ObjectKind::Table && !self.is_system()
    }
}

/// Reads every row of the catalog, in storage order.
///
/// The catalog is an ordinary table at a fixed definition page, so it is
/// read with the same loader and cursor as user tables.
pub(crate) fn scan(reader: &PageReader) -> Result<Vec<CatalogEntry>, MdbError> {
    scan_rows(reader).map_err(|e| MdbError::CatalogRead(e.to_string()))
}

fn scan_rows(reader: &PageReader) -> Result<Vec<CatalogEntry>, StorageError> {
    let def = TableDef::load(reader, CATALOG_TABLE, CATALOG_TDEF_PAGE)?;
    let schema = def.schema();
    let column = |name: &str| {
        schema
            .get_column_index(name)
            .ok_or_else(|| StorageError::corrupt(format!("catalog has no {name} column")))
    };
    let (id_col, name_col, type_col, flags_col) =
        (column("Id")?, column("Name")?, column("Type")?, column("Flags")?);

    let pages = read_usage_map(reader, def.usage_map)?;
    let mut cursor = RowCursor::new(def.tdef_page, pages);
    let mut entries = Vec::new();

    while let Some(row) = cursor.next_row(reader)? {
        let fields = schema.crack_row(&row, reader.format())?;
        let cell = |j: usize| decode_cell(&schema.columns[j], &fields[j], &row, reader);

        let Cell::Text(name) = cell(name_col)? else {
            continue;
        };
        let id = cell(id_col)?.as_i64().unwrap_or(0);
        let object_type = cell(type_col)?.as_i64().unwrap_or(-1);
        let flags = cell(flags_col)?.as_i64().unwrap_or(0);

        entries.push(CatalogEntry {
            name,
            kind: ObjectKind::from_type(object_type),
            table_page: (id & TABLE_PAGE_MASK) as PageId,
            flags: flags as u32,
        });
    }

    debug!(entries = entries.len(), "scanned catalog");
    Ok(entries)
}
