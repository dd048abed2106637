use tracing::debug;

use super::{
    column_def::{COLUMN_AUTONUMBER, COLUMN_FIXED, COLUMN_NULLABLE, ColumnDef},
    index_def::{IndexDef, IndexKey, IndexKind, SortOrder},
    schema::Schema,
};
use crate::{
    core::types::ColumnType,
    storage::{
        JetFormat, PageId, PageReader, RowPointer, StorageError, StorageResult,
        format::{MAX_INDEX_COLUMNS, PAGE_TABLE_DEF, TDEF_NEXT_PAGE_OFFSET, TDEF_PAGE_HEADER},
        page::{le_u16, le_u32, read_slice},
        text::decode_text,
    },
};

/// Key-column slot value meaning "no column".
const EMPTY_KEY_SLOT: u16 = 0xFFFF;

/// A table definition decoded from its definition pages.
///
/// Immutable once loaded; a [`Table`](crate::Table) holds one for its whole
/// lifetime.
#[derive(Debug, Clone)]
pub struct TableDef {
    /// The table name.
    pub(crate) name: String,

    /// First page of the definition chain.
    pub(crate) tdef_page: PageId,

    /// Row count recorded in the definition.
    pub(crate) num_rows: u32,

    /// Where the table's data-page map lives.
    pub(crate) usage_map: RowPointer,

    /// The table's schema defining its columns.
    pub(crate) schema: Schema,

    pub(crate) indexes: Vec<IndexDef>,
}

impl TableDef {
    /// Reads the definition chain starting at `tdef_page` and parses it.
    pub fn load(reader: &PageReader, name: &str, tdef_page: PageId) -> StorageResult<Self> {
        let bytes = Self::read_chain(reader, tdef_page)?;
        let def = Self::parse(name, tdef_page, &bytes, reader.format())?;

        debug!(
            table = name,
            tdef_page,
            columns = def.schema.len(),
            indexes = def.indexes.len(),
            rows = def.num_rows,
            "loaded table definition"
        );
        Ok(def)
    }

    /// Concatenates the definition pages. Continuation pages contribute
    /// everything after their 8-byte header.
    fn read_chain(reader: &PageReader, first: PageId) -> StorageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut next = first;
        let mut visited = 0u32;

        while next != 0 {
            if visited >= reader.page_count() {
                return Err(StorageError::corrupt(format!(
                    "table definition chain starting at page {first} loops"
                )));
            }
            visited += 1;

            let page = reader.read_page(next)?;
            page.expect_type(PAGE_TABLE_DEF)?;
            if bytes.is_empty() {
                bytes.extend_from_slice(page.bytes());
            } else {
                bytes.extend_from_slice(&page.bytes()[TDEF_PAGE_HEADER..]);
            }
            next = page.u32_at(TDEF_NEXT_PAGE_OFFSET)?;
        }

        Ok(bytes)
    }

    /// Parses a concatenated definition.
    ///
    /// Layout after the fixed header: one row-count entry per real index,
    /// the column entries, the column names, the real index definitions,
    /// the logical index entries and finally the index names.
    pub(crate) fn parse(
        name: &str,
        tdef_page: PageId,
        bytes: &[u8],
        format: &JetFormat,
    ) -> StorageResult<Self> {
        let num_rows = le_u32(bytes, format.tab_num_rows_offset)?;
        let num_var_cols = le_u16(bytes, format.tab_num_var_cols_offset)?;
        let num_cols = usize::from(le_u16(bytes, format.tab_num_cols_offset)?);
        let num_idxs = le_u32(bytes, format.tab_num_idxs_offset)? as usize;
        let num_ridxs = le_u32(bytes, format.tab_num_ridxs_offset)? as usize;
        let usage_map = RowPointer::from_raw(le_u32(bytes, format.tab_usage_map_offset)?);

        let mut pos = format.tab_cols_start_offset + num_ridxs * format.tab_ridx_entry_size;

        let mut entries = Vec::with_capacity(num_cols);
        for _ in 0..num_cols {
            let entry = read_slice(bytes, pos, format.col_entry_size)?;
            entries.push(entry);
            pos += format.col_entry_size;
        }

        let mut columns = Vec::with_capacity(num_cols);
        for entry in entries {
            let column_name = read_name(bytes, &mut pos, format)?;
            columns.push(parse_column(entry, column_name, format)?);
        }
        columns.sort_by_key(|col| col.column_number);

        let mut real_indexes = Vec::with_capacity(num_ridxs);
        for i in 0..num_ridxs {
            let def = read_slice(bytes, pos, format.ridx_def_size)?;
            let row_count_at = format.tab_cols_start_offset
                + i * format.tab_ridx_entry_size
                + format.tab_ridx_rows_offset;
            real_indexes.push(parse_real_index(def, le_u32(bytes, row_count_at)?, format)?);
            pos += format.ridx_def_size;
        }

        let mut logical = Vec::with_capacity(num_idxs);
        for _ in 0..num_idxs {
            let entry = read_slice(bytes, pos, format.lidx_entry_size)?;
            logical.push((
                le_u32(entry, format.lidx_num_offset)?,
                le_u32(entry, format.lidx_real_num_offset)? as usize,
                entry[format.lidx_type_offset],
            ));
            pos += format.lidx_entry_size;
        }

        let mut indexes = Vec::with_capacity(num_idxs);
        for (number, real_number, type_code) in logical {
            let index_name = read_name(bytes, &mut pos, format)?;
            let (keys, row_count, flags) = match real_indexes.get(real_number) {
                Some(real) => (real.keys.clone(), real.row_count, real.flags),
                None => (Vec::new(), 0, 0),
            };

            indexes.push(IndexDef {
                number,
                name: index_name,
                type_code,
                kind: IndexKind::from_repr(type_code),
                row_count,
                flags,
                keys,
            });
        }

        Ok(Self {
            name: name.to_owned(),
            tdef_page,
            num_rows,
            usage_map,
            schema: Schema::new(columns, num_var_cols),
            indexes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

struct RealIndex {
    keys: Vec<IndexKey>,
    row_count: u32,
    flags: u8,
}

fn parse_column(entry: &[u8], name: String, format: &JetFormat) -> StorageResult<ColumnDef> {
    let code = entry[0];
    let column_type = ColumnType::from_repr(code).ok_or_else(|| {
        StorageError::corrupt(format!("column {name} has unknown type code {code:#04x}"))
    })?;
    let flags = entry[format.col_flags_offset];

    let (precision, scale) = if column_type.has_precision() {
        (entry[format.col_prec_offset], entry[format.col_scale_offset])
    } else {
        (0, 0)
    };

    Ok(ColumnDef {
        name,
        column_type,
        size: le_u16(entry, format.col_size_offset)?,
        precision,
        scale,
        is_fixed: flags & COLUMN_FIXED != 0,
        nullable: flags & COLUMN_NULLABLE != 0,
        autonumber: flags & COLUMN_AUTONUMBER != 0,
        column_number: le_u16(entry, format.col_num_offset)?,
        var_column_number: le_u16(entry, format.col_var_offset)?,
        fixed_offset: le_u16(entry, format.col_fixed_offset)?,
    })
}

fn parse_real_index(def: &[u8], row_count: u32, format: &JetFormat) -> StorageResult<RealIndex> {
    let mut pos = format.ridx_def_prefix;
    let mut keys = Vec::new();

    for _ in 0..MAX_INDEX_COLUMNS {
        let column = le_u16(def, pos)?;
        let order = def[pos + 2];
        pos += 3;

        if column == EMPTY_KEY_SLOT {
            continue;
        }
        keys.push(IndexKey {
            column_number: column + 1,
            order: if order != 0 {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            },
        });
    }

    // used-pages pointer and first index page
    pos += 8;

    Ok(RealIndex {
        keys,
        row_count,
        flags: def[pos],
    })
}

/// Reads a length-prefixed name and advances `pos` past it.
fn read_name(bytes: &[u8], pos: &mut usize, format: &JetFormat) -> StorageResult<String> {
    let len = if format.name_len_size == 1 {
        usize::from(read_slice(bytes, *pos, 1)?[0])
    } else {
        usize::from(le_u16(bytes, *pos)?)
    };
    *pos += format.name_len_size;

    let raw = read_slice(bytes, *pos, len)?;
    *pos += len;
    Ok(decode_text(raw, format.unicode_text))
}
