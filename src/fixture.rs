//! Builds small Jet 3 / Jet 4 database files for tests.
//!
//! Page layout of a built file: page 0 is the header, page 1 an empty data
//! page owned by nobody, page 2 the catalog's table definition. Each user
//! table then gets its definition page(s), a usage-map page, a page for
//! long values and lookup targets, and its data pages. The catalog's own
//! pages come last.

use std::{collections::BTreeMap, io::Write};

use tempfile::NamedTempFile;

use crate::{
    core::types::ColumnType,
    db::table::{
        column_def::{COLUMN_AUTONUMBER, COLUMN_FIXED, COLUMN_NULLABLE},
        index_def::{INDEX_IGNORE_NULLS, INDEX_REQUIRED, INDEX_UNIQUE, IndexKind},
    },
    storage::{
        JetFormat, JetVersion, PageId, RowPointer,
        format::{
            ACE_MAGIC, CATALOG_TDEF_PAGE, JET_MAGIC, MAGIC_OFFSET, MAX_INDEX_COLUMNS, PAGE_DATA,
            PAGE_TABLE_DEF, ROW_DELETED_FLAG, ROW_LOOKUP_FLAG, TDEF_NEXT_PAGE_OFFSET,
            TDEF_PAGE_HEADER, VERSION_OFFSET,
        },
        long_value::{chained_header, inline_header, single_page_header},
        text::encode_ucs2,
        usage_map::{MAP_INLINE, MAP_REFERENCE},
    },
};

/// A memo too long to store inline.
pub(crate) const LONG_NOTE: &str = "Ship via the northern route. Call ahead before delivery; the loading dock \
     closes at four. Invoice the regional office, not the store, and attach the customs forms \
     for every crate.";

const BLANK_PAGE: PageId = 1;
const USER_TABLE: u8 = 0x4E;
const PAGE_USAGE_BITMAP: u8 = 0x05;

/// Number of rows a chained memo is split into.
const CHAIN_LINKS: usize = 3;

#[derive(Debug, Clone)]
pub(crate) struct ColumnSpec {
    name: String,
    column_type: ColumnType,
    size: Option<u16>,
    precision: u8,
    scale: u8,
    nullable: bool,
    autonumber: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            size: None,
            precision: 0,
            scale: 0,
            nullable: true,
            autonumber: false,
        }
    }

    pub fn size(mut self, size: u16) -> Self {
        self.size = Some(size);
        self
    }

    pub fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn autonumber(mut self) -> Self {
        self.autonumber = true;
        self.nullable = false;
        self
    }

    fn is_fixed(&self) -> bool {
        self.column_type.fixed_size().is_some()
    }

    fn declared_size(&self) -> u16 {
        self.size.unwrap_or(match self.column_type.fixed_size() {
            Some(width) => width as u16,
            None if self.column_type.is_long_value() => 0,
            None => 255,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct IndexSpec {
    name: String,
    kind: IndexKind,
    keys: Vec<(usize, bool)>,
    flags: u8,
}

impl IndexSpec {
    /// `keys` are (column position, ascending) pairs.
    pub fn new(name: &str, keys: &[(usize, bool)]) -> Self {
        Self {
            name: name.to_string(),
            kind: IndexKind::Normal,
            keys: keys.to_vec(),
            flags: 0,
        }
    }

    pub fn primary_key(name: &str, columns: &[usize]) -> Self {
        Self {
            kind: IndexKind::PrimaryKey,
            flags: INDEX_UNIQUE | INDEX_REQUIRED,
            ..Self::new(name, &columns.iter().map(|&c| (c, true)).collect::<Vec<_>>())
        }
    }

    pub fn foreign_key(name: &str, columns: &[usize]) -> Self {
        Self {
            kind: IndexKind::ForeignKey,
            flags: INDEX_IGNORE_NULLS,
            ..Self::new(name, &columns.iter().map(|&c| (c, true)).collect::<Vec<_>>())
        }
    }

    pub fn unique(mut self) -> Self {
        self.flags |= INDEX_UNIQUE;
        self
    }
}

/// One stored value.
#[derive(Debug, Clone)]
pub(crate) enum Field {
    Null,
    Bool(bool),
    /// Bytes for a fixed-width column.
    Raw(Vec<u8>),
    Text(String),
    /// Jet 4 compressed text; plain single-byte text in Jet 3.
    Compressed(String),
    Binary(Vec<u8>),
    /// Memo stored inline after its long-value header.
    Memo(String),
    /// Memo stored in a row of the table's long-value page.
    LongMemo(String),
    /// Memo split over several long-value rows, each pointing at the next.
    ChainedMemo(String),
}

impl Field {
    pub fn byte(v: u8) -> Self {
        Field::Raw(vec![v])
    }

    pub fn int(v: i16) -> Self {
        Field::Raw(v.to_le_bytes().to_vec())
    }

    pub fn long(v: i32) -> Self {
        Field::Raw(v.to_le_bytes().to_vec())
    }

    pub fn money(v: f64) -> Self {
        Field::Raw(((v * 10_000.0).round() as i64).to_le_bytes().to_vec())
    }

    pub fn single(v: f32) -> Self {
        Field::Raw(v.to_le_bytes().to_vec())
    }

    pub fn double(v: f64) -> Self {
        Field::Raw(v.to_le_bytes().to_vec())
    }

    pub fn date(days: f64) -> Self {
        Field::Raw(days.to_le_bytes().to_vec())
    }

    pub fn text(v: &str) -> Self {
        Field::Text(v.to_string())
    }
}

#[derive(Debug, Clone)]
enum RowSpec {
    Live(Vec<Field>),
    Deleted(Vec<Field>),
    /// Stored on the long-value page and reached through a lookup row.
    Moved(Vec<Field>),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone)]
pub(crate) struct TableSpec {
    name: String,
    columns: Vec<ColumnSpec>,
    indexes: Vec<IndexSpec>,
    rows: Vec<RowSpec>,
    foreign_page_in_map: bool,
    reference_map: bool,
    map_start: Option<PageId>,
}

impl TableSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
            rows: Vec::new(),
            foreign_page_in_map: false,
            reference_map: false,
            map_start: None,
        }
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn row(mut self, fields: Vec<Field>) -> Self {
        self.rows.push(RowSpec::Live(fields));
        self
    }

    pub fn deleted_row(mut self, fields: Vec<Field>) -> Self {
        self.rows.push(RowSpec::Deleted(fields));
        self
    }

    pub fn moved_row(mut self, fields: Vec<Field>) -> Self {
        self.rows.push(RowSpec::Moved(fields));
        self
    }

    /// A row stored exactly as given.
    pub fn raw_row(mut self, bytes: Vec<u8>) -> Self {
        self.rows.push(RowSpec::Raw(bytes));
        self
    }

    /// Also lists the blank page 1 in the usage map.
    pub fn foreign_page_in_map(mut self) -> Self {
        self.foreign_page_in_map = true;
        self
    }

    /// Stores the usage map on a separate bitmap page (map type 1).
    pub fn reference_usage_map(mut self) -> Self {
        self.reference_map = true;
        self
    }

    /// Writes `start` as the inline map's first page without shifting the
    /// bitmap, so the listed pages are wrong or out of range.
    pub fn usage_map_start(mut self, start: PageId) -> Self {
        self.map_start = Some(start);
        self
    }

    fn live_rows(&self) -> u32 {
        self.rows
            .iter()
            .filter(|row| !matches!(row, RowSpec::Deleted(_)))
            .count() as u32
    }

    fn var_column_count(&self) -> usize {
        self.columns.iter().filter(|c| !c.is_fixed()).count()
    }

    /// (fixed offset, variable column number) per column.
    fn layout(&self) -> Vec<(u16, u16)> {
        let mut fixed_offset = 0;
        let mut var_number = 0;
        self.columns
            .iter()
            .map(|column| match column.column_type.fixed_size() {
                Some(width) => {
                    let at = fixed_offset;
                    fixed_offset += width as u16;
                    (at, 0)
                }
                None => {
                    var_number += 1;
                    (0, var_number - 1)
                }
            })
            .collect()
    }
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn encode_str(text: &str, format: &JetFormat) -> Vec<u8> {
    if format.unicode_text {
        encode_ucs2(text)
    } else {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }
}

fn push_name(buf: &mut Vec<u8>, name: &str, format: &JetFormat) {
    let bytes = encode_str(name, format);
    if format.name_len_size == 1 {
        buf.push(bytes.len() as u8);
    } else {
        buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    }
    buf.extend_from_slice(&bytes);
}

/// Encodes a complete table definition as one buffer, before it is split
/// into pages.
pub(crate) fn encode_tdef(
    spec: &TableSpec,
    format: &JetFormat,
    usage_map: RowPointer,
    num_rows: u32,
) -> Vec<u8> {
    let num_indexes = spec.indexes.len();
    let mut buf = vec![0u8; format.tab_cols_start_offset];
    buf[0] = PAGE_TABLE_DEF;
    buf[1] = 0x01;
    put_u32(&mut buf, format.tab_num_rows_offset, num_rows);
    buf[format.tab_type_offset] = USER_TABLE;
    put_u16(&mut buf, format.tab_num_var_cols_offset, spec.var_column_count() as u16);
    put_u16(&mut buf, format.tab_num_cols_offset, spec.columns.len() as u16);
    put_u32(&mut buf, format.tab_num_idxs_offset, num_indexes as u32);
    put_u32(&mut buf, format.tab_num_ridxs_offset, num_indexes as u32);
    put_u32(&mut buf, format.tab_usage_map_offset, usage_map.to_raw());

    for _ in 0..num_indexes {
        let mut entry = vec![0u8; format.tab_ridx_entry_size];
        put_u32(&mut entry, format.tab_ridx_rows_offset, num_rows);
        buf.extend_from_slice(&entry);
    }

    for (number, (column, (fixed_offset, var_number))) in
        spec.columns.iter().zip(spec.layout()).enumerate()
    {
        let mut entry = vec![0u8; format.col_entry_size];
        entry[0] = column.column_type.code();
        put_u16(&mut entry, format.col_num_offset, number as u16);
        put_u16(&mut entry, format.col_var_offset, var_number);
        put_u16(&mut entry, format.col_row_num_offset, number as u16);
        entry[format.col_prec_offset] = column.precision;
        entry[format.col_scale_offset] = column.scale;

        let mut flags = 0;
        if column.is_fixed() {
            flags |= COLUMN_FIXED;
        }
        if column.nullable {
            flags |= COLUMN_NULLABLE;
        }
        if column.autonumber {
            flags |= COLUMN_AUTONUMBER;
        }
        entry[format.col_flags_offset] = flags;
        put_u16(&mut entry, format.col_fixed_offset, fixed_offset);
        put_u16(&mut entry, format.col_size_offset, column.declared_size());
        buf.extend_from_slice(&entry);
    }

    for column in &spec.columns {
        push_name(&mut buf, &column.name, format);
    }

    for index in &spec.indexes {
        let mut def = vec![0u8; format.ridx_def_size];
        let mut pos = format.ridx_def_prefix;
        for slot in 0..MAX_INDEX_COLUMNS {
            match index.keys.get(slot) {
                Some(&(column, ascending)) => {
                    put_u16(&mut def, pos, column as u16);
                    def[pos + 2] = u8::from(ascending);
                }
                None => put_u16(&mut def, pos, 0xFFFF),
            }
            pos += 3;
        }
        def[pos + 8] = index.flags;
        buf.extend_from_slice(&def);
    }

    for (number, index) in spec.indexes.iter().enumerate() {
        let mut entry = vec![0u8; format.lidx_entry_size];
        put_u32(&mut entry, format.lidx_num_offset, number as u32);
        put_u32(&mut entry, format.lidx_real_num_offset, number as u32);
        entry[format.lidx_type_offset] = index.kind as u8;
        buf.extend_from_slice(&entry);
    }

    for index in &spec.indexes {
        push_name(&mut buf, &index.name, format);
    }

    buf
}

/// Encodes one row. Long memos are appended to `long_values` and
/// referenced by pointer.
fn encode_row(
    spec: &TableSpec,
    format: &JetFormat,
    fields: &[Field],
    long_values: &mut Vec<(Vec<u8>, u16)>,
    long_value_page: PageId,
) -> Vec<u8> {
    assert_eq!(fields.len(), spec.columns.len(), "field count for {}", spec.name);

    let layout = spec.layout();
    let fixed_len: usize = spec
        .columns
        .iter()
        .filter_map(|c| c.column_type.fixed_size())
        .sum();
    let count_size = format.row_count_size;

    let mut row = vec![0u8; count_size + fixed_len];
    if count_size == 1 {
        row[0] = spec.columns.len() as u8;
    } else {
        put_u16(&mut row, 0, spec.columns.len() as u16);
    }

    let mut present = vec![false; spec.columns.len()];
    let mut var_data: Vec<(usize, Vec<u8>)> = Vec::new();

    for (j, (column, field)) in spec.columns.iter().zip(fields).enumerate() {
        let (fixed_offset, var_number) = layout[j];
        let bytes = match field {
            Field::Null => None,
            Field::Bool(b) => {
                present[j] = *b;
                continue;
            }
            Field::Raw(bytes) | Field::Binary(bytes) => Some(bytes.clone()),
            Field::Text(text) => Some(encode_str(text, format)),
            Field::Compressed(text) if format.unicode_text => {
                let mut bytes = vec![0xFF, 0xFE];
                bytes.extend(text.bytes());
                Some(bytes)
            }
            Field::Compressed(text) => Some(encode_str(text, format)),
            Field::Memo(text) => {
                let data = encode_str(text, format);
                let mut bytes = inline_header(data.len()).to_vec();
                bytes.extend_from_slice(&data);
                Some(bytes)
            }
            Field::LongMemo(text) => {
                let data = encode_str(text, format);
                let pointer = RowPointer {
                    page: long_value_page,
                    row: long_values.len() as u16,
                };
                let header = single_page_header(data.len(), pointer).to_vec();
                long_values.push((data, 0));
                Some(header)
            }
            Field::ChainedMemo(text) => {
                let data = encode_str(text, format);
                let first = long_values.len();
                let link_len = data.len().div_ceil(CHAIN_LINKS);
                let links: Vec<_> = data.chunks(link_len).collect();
                for (i, chunk) in links.iter().enumerate() {
                    let next = if i + 1 < links.len() {
                        RowPointer {
                            page: long_value_page,
                            row: (first + i + 1) as u16,
                        }
                        .to_raw()
                    } else {
                        0
                    };
                    let mut link = next.to_le_bytes().to_vec();
                    link.extend_from_slice(chunk);
                    long_values.push((link, 0));
                }
                let pointer = RowPointer {
                    page: long_value_page,
                    row: first as u16,
                };
                Some(chained_header(data.len(), pointer).to_vec())
            }
        };

        let Some(bytes) = bytes else {
            if !column.is_fixed() {
                var_data.push((usize::from(var_number), Vec::new()));
            }
            continue;
        };
        present[j] = true;

        if column.is_fixed() {
            let at = count_size + usize::from(fixed_offset);
            row[at..at + bytes.len()].copy_from_slice(&bytes);
        } else {
            var_data.push((usize::from(var_number), bytes));
        }
    }

    if spec.var_column_count() > 0 {
        var_data.sort_by_key(|(number, _)| *number);
        let mut offsets = Vec::with_capacity(var_data.len() + 1);
        for (_, bytes) in &var_data {
            offsets.push(row.len());
            row.extend_from_slice(bytes);
        }
        offsets.push(row.len());

        let mask_len = spec.columns.len().div_ceil(8);
        if count_size == 1 {
            row.extend(offsets.iter().rev().map(|offset| *offset as u8));
            push_jump_table(&mut row, &offsets, mask_len);
            row.push(var_data.len() as u8);
        } else {
            for offset in offsets.iter().rev() {
                row.extend_from_slice(&(*offset as u16).to_le_bytes());
            }
            row.extend_from_slice(&(var_data.len() as u16).to_le_bytes());
        }
    }

    let mut mask = vec![0u8; spec.columns.len().div_ceil(8)];
    for (j, _) in present.iter().enumerate().filter(|(_, set)| **set) {
        mask[j / 8] |= 1 << (j % 8);
    }
    row.extend_from_slice(&mask);
    row
}

/// Jet 3 offsets are single bytes. Jump entry `j` names the first variable
/// column at or past byte `256 * (j + 1)`; entries are stored nearest to the
/// column count first. Readers derive the entry count from the row length,
/// so a row whose last byte falls one block past its variable data carries
/// one unused entry in front.
fn push_jump_table(row: &mut Vec<u8>, offsets: &[usize], mask_len: usize) {
    let var_end = offsets.last().copied().unwrap_or(0);
    let jumps: Vec<u8> = (1..=var_end / 256)
        .map(|block| {
            let column = offsets
                .iter()
                .position(|&offset| offset >= block * 256)
                .expect("variable data reaches the block");
            u8::try_from(column).expect("jet3 rows have fewer than 256 variable columns")
        })
        .collect();

    // Index of the row's last byte once the count and mask follow.
    let row_end = row.len() + jumps.len() + 1 + mask_len - 1;
    if row_end / 256 > jumps.len() {
        assert_eq!((row_end + 1) / 256, jumps.len() + 1, "jump table does not settle");
        row.push(0xFF);
    }
    row.extend(jumps.iter().rev());
}

/// A data page holding `rows` (bytes, slot flags) packed from the end.
fn data_page(format: &JetFormat, owner: PageId, rows: &[(Vec<u8>, u16)]) -> Vec<u8> {
    let mut page = vec![0u8; format.page_size];
    page[0] = PAGE_DATA;
    page[1] = 0x01;
    put_u32(&mut page, format.data_tdef_offset, owner);
    put_u16(&mut page, format.data_row_count_offset, rows.len() as u16);

    let mut end = format.page_size;
    for (i, (bytes, flags)) in rows.iter().enumerate() {
        let start = end - bytes.len();
        page[start..end].copy_from_slice(bytes);
        put_u16(
            &mut page,
            format.data_row_table_offset() + i * 2,
            start as u16 | flags,
        );
        end = start;
    }
    page
}

/// Splits rows into pages by free space.
fn pack_rows(format: &JetFormat, rows: Vec<(Vec<u8>, u16)>) -> Vec<Vec<(Vec<u8>, u16)>> {
    let mut pages = vec![Vec::new()];
    let mut used = format.data_row_table_offset();

    for row in rows {
        let needed = row.0.len() + 2;
        if used + needed > format.page_size {
            pages.push(Vec::new());
            used = format.data_row_table_offset();
        }
        used += needed;
        if let Some(page) = pages.last_mut() {
            page.push(row);
        }
    }
    pages
}

/// Extra catalog entry: (name, type, flags, id).
type CatalogRow = (String, i16, u32, i32);

/// Assembles a database file in memory.
pub(crate) struct DbBuilder {
    version: JetVersion,
    tables: Vec<TableSpec>,
    extra_entries: Vec<CatalogRow>,
}

impl DbBuilder {
    pub fn new(version: JetVersion) -> Self {
        Self {
            version,
            tables: Vec::new(),
            extra_entries: Vec::new(),
        }
    }

    pub fn table(mut self, spec: TableSpec) -> Self {
        self.tables.push(spec);
        self
    }

    /// Adds a catalog row that is not one of the built tables.
    pub fn catalog_entry(mut self, name: &str, object_type: i16, flags: u32, id: i32) -> Self {
        self.extra_entries.push((name.to_string(), object_type, flags, id));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let format = self.version.format();
        let mut pages: BTreeMap<PageId, Vec<u8>> = BTreeMap::new();

        let mut header = vec![0u8; format.page_size];
        header[1] = 0x01;
        let magic = if self.version.is_jet3() || self.version == JetVersion::Jet4 {
            JET_MAGIC
        } else {
            ACE_MAGIC
        };
        header[MAGIC_OFFSET..MAGIC_OFFSET + magic.len()].copy_from_slice(magic);
        header[VERSION_OFFSET] = self.version.code();
        pages.insert(0, header);
        pages.insert(BLANK_PAGE, data_page(format, 0, &[]));

        let mut next_page = CATALOG_TDEF_PAGE + 1;
        let mut catalog_rows = vec![
            vec![
                Field::long(CATALOG_TDEF_PAGE as i32),
                Field::long(0x0F00_0001),
                Field::text("MSysObjects"),
                Field::int(1),
                Field::long(0x8000_0002_u32 as i32),
            ],
            vec![
                Field::long(0x0F00_0001),
                Field::long(0x0F00_0000),
                Field::text("Tables"),
                Field::int(3),
                Field::long(0x8000_0000_u32 as i32),
            ],
        ];

        for spec in &self.tables {
            let tdef_page = next_page;
            next_page += 1;
            self.place_table(spec, tdef_page, &mut next_page, &mut pages);
            catalog_rows.push(vec![
                Field::long(tdef_page as i32),
                Field::long(0x0F00_0001),
                Field::text(&spec.name),
                Field::int(1),
                Field::long(0),
            ]);
        }

        for (name, object_type, flags, id) in &self.extra_entries {
            catalog_rows.push(vec![
                Field::long(*id),
                Field::long(0x0F00_0001),
                Field::text(name),
                Field::int(*object_type),
                Field::long(*flags as i32),
            ]);
        }

        let catalog = catalog_rows
            .into_iter()
            .fold(catalog_spec(), |spec, row| spec.row(row));
        self.place_table(&catalog, CATALOG_TDEF_PAGE, &mut next_page, &mut pages);

        let page_count = next_page as usize;
        let mut file = vec![0u8; page_count * format.page_size];
        for (id, data) in pages {
            let at = id as usize * format.page_size;
            file[at..at + format.page_size].copy_from_slice(&data);
        }
        file
    }

    /// Writes the definition at `tdef_page` and the table's other pages at
    /// `next_page` onwards.
    fn place_table(
        &self,
        spec: &TableSpec,
        tdef_page: PageId,
        next_page: &mut PageId,
        pages: &mut BTreeMap<PageId, Vec<u8>>,
    ) {
        let format = self.version.format();

        let probe = encode_tdef(spec, format, RowPointer { page: 0, row: 0 }, 0);
        let continuation = format.page_size - TDEF_PAGE_HEADER;
        let extra_tdef_pages = probe.len().saturating_sub(format.page_size).div_ceil(continuation);

        let first_own = *next_page;
        let tdef_pages: Vec<PageId> = std::iter::once(tdef_page)
            .chain((0..extra_tdef_pages as u32).map(|i| first_own + i))
            .collect();
        *next_page += extra_tdef_pages as u32;

        let map_page = *next_page;
        let long_value_page = map_page + 1;
        *next_page += 2;

        let mut long_values: Vec<(Vec<u8>, u16)> = Vec::new();
        let mut rows = Vec::new();
        for row in &spec.rows {
            match row {
                RowSpec::Live(fields) => {
                    rows.push((encode_row(spec, format, fields, &mut long_values, long_value_page), 0));
                }
                RowSpec::Deleted(fields) => {
                    let bytes = encode_row(spec, format, fields, &mut long_values, long_value_page);
                    rows.push((bytes, ROW_DELETED_FLAG));
                }
                RowSpec::Moved(fields) => {
                    let bytes = encode_row(spec, format, fields, &mut long_values, long_value_page);
                    let pointer = RowPointer {
                        page: long_value_page,
                        row: long_values.len() as u16,
                    };
                    long_values.push((bytes, ROW_DELETED_FLAG));
                    rows.push((pointer.to_raw().to_le_bytes().to_vec(), ROW_LOOKUP_FLAG));
                }
                RowSpec::Raw(bytes) => rows.push((bytes.clone(), 0)),
            }
        }

        let mut data_pages = Vec::new();
        for page_rows in pack_rows(format, rows) {
            let id = *next_page;
            *next_page += 1;
            pages.insert(id, data_page(format, tdef_page, &page_rows));
            data_pages.push(id);
        }
        pages.insert(long_value_page, data_page(format, tdef_page, &long_values));

        let mut in_map = data_pages.clone();
        if spec.foreign_page_in_map {
            in_map.push(BLANK_PAGE);
        }
        let usage_map = if spec.reference_map {
            let bitmap_page = *next_page;
            *next_page += 1;

            let mut bitmap = vec![0u8; format.page_size];
            bitmap[0] = PAGE_USAGE_BITMAP;
            bitmap[1] = 0x01;
            for page in in_map {
                bitmap[4 + page as usize / 8] |= 1 << (page % 8);
            }
            pages.insert(bitmap_page, bitmap);

            // Slot 0 covers the file; slot 1 is unused.
            let mut map = vec![MAP_REFERENCE];
            map.extend_from_slice(&bitmap_page.to_le_bytes());
            map.extend_from_slice(&0u32.to_le_bytes());
            map
        } else {
            let last = in_map.iter().copied().max().unwrap_or(0);
            let mut map = vec![0u8; 5 + (last as usize / 8 + 1)];
            map[0] = MAP_INLINE;
            put_u32(&mut map, 1, spec.map_start.unwrap_or(0));
            for page in in_map {
                map[5 + page as usize / 8] |= 1 << (page % 8);
            }
            map
        };
        pages.insert(map_page, data_page(format, 0, &[(usage_map, 0)]));

        let tdef = encode_tdef(
            spec,
            format,
            RowPointer { page: map_page, row: 0 },
            spec.live_rows(),
        );

        let (first, mut rest) = tdef.split_at(tdef.len().min(format.page_size));
        for (i, &id) in tdef_pages.iter().enumerate() {
            let mut page = vec![0u8; format.page_size];
            if i == 0 {
                page[..first.len()].copy_from_slice(first);
            } else {
                page[0] = PAGE_TABLE_DEF;
                page[1] = 0x01;
                let take = rest.len().min(continuation);
                page[TDEF_PAGE_HEADER..TDEF_PAGE_HEADER + take].copy_from_slice(&rest[..take]);
                rest = &rest[take..];
            }
            if let Some(&next) = tdef_pages.get(i + 1) {
                put_u32(&mut page, TDEF_NEXT_PAGE_OFFSET, next);
            }
            pages.insert(id, page);
        }
    }

    pub fn write(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(&self.build()).expect("write fixture");
        file.flush().expect("flush fixture");
        file
    }
}

fn catalog_spec() -> TableSpec {
    TableSpec::new("MSysObjects")
        .column(ColumnSpec::new("Id", ColumnType::LongInt))
        .column(ColumnSpec::new("ParentId", ColumnType::LongInt))
        .column(ColumnSpec::new("Name", ColumnType::Text).size(128))
        .column(ColumnSpec::new("Type", ColumnType::Int))
        .column(ColumnSpec::new("Flags", ColumnType::LongInt))
}

/// Two related tables plus a few non-table catalog entries.
pub(crate) fn northwind(version: JetVersion) -> DbBuilder {
    let customers = TableSpec::new("Customers")
        .column(ColumnSpec::new("CustomerID", ColumnType::LongInt).autonumber())
        .column(ColumnSpec::new("CompanyName", ColumnType::Text).size(80))
        .column(ColumnSpec::new("City", ColumnType::Text).size(30))
        .column(ColumnSpec::new("Active", ColumnType::Bool))
        .index(IndexSpec::primary_key("PrimaryKey", &[0]))
        .row(vec![
            Field::long(1),
            Field::text("Alfreds Futterkiste"),
            Field::text("Berlin"),
            Field::Bool(true),
        ])
        .row(vec![
            Field::long(2),
            Field::text("Ana Trujillo"),
            Field::text("México D.F."),
            Field::Bool(false),
        ])
        .row(vec![
            Field::long(3),
            Field::text("Antonio Moreno"),
            Field::Null,
            Field::Bool(true),
        ]);

    let orders = TableSpec::new("Orders")
        .column(ColumnSpec::new("OrderID", ColumnType::LongInt).autonumber())
        .column(ColumnSpec::new("CustomerID", ColumnType::LongInt))
        .column(ColumnSpec::new("ShipName", ColumnType::Text).size(80))
        .column(ColumnSpec::new("Freight", ColumnType::Money).precision(19, 4))
        .column(ColumnSpec::new("OrderDate", ColumnType::DateTime))
        .column(ColumnSpec::new("Notes", ColumnType::Memo))
        .column(ColumnSpec::new("Weight", ColumnType::Float))
        .column(ColumnSpec::new("Quantity", ColumnType::Int))
        .index(IndexSpec::primary_key("PrimaryKey", &[0]))
        .index(IndexSpec::foreign_key("CustomerOrders", &[1]))
        .row(vec![
            Field::long(10248),
            Field::long(1),
            Field::text("Vins et alcools"),
            Field::money(32.38),
            Field::date(35250.0),
            Field::Memo("Deliver to back door".to_string()),
            Field::single(1.5),
            Field::int(12),
        ])
        .deleted_row(vec![
            Field::long(10249),
            Field::long(2),
            Field::text("Toms Spezialitäten"),
            Field::money(11.61),
            Field::date(35251.0),
            Field::Null,
            Field::single(4.0),
            Field::int(1),
        ])
        .row(vec![
            Field::long(10250),
            Field::long(2),
            Field::Compressed("Hanari Carnes".to_string()),
            Field::money(65.83),
            Field::date(35254.0),
            Field::LongMemo(LONG_NOTE.to_string()),
            Field::single(2.25),
            Field::int(3),
        ])
        .moved_row(vec![
            Field::long(10251),
            Field::long(3),
            Field::text("Victuailles en stock"),
            Field::money(41.34),
            Field::date(35255.5),
            Field::Null,
            Field::Null,
            Field::int(7),
        ])
        .row(vec![
            Field::long(10252),
            Field::long(1),
            Field::text("Suprêmes délices"),
            Field::money(51.3),
            Field::date(35256.0),
            Field::Memo("Fragile".to_string()),
            Field::single(0.25),
            Field::int(40),
        ]);

    DbBuilder::new(version)
        .table(customers)
        .table(orders)
        .catalog_entry("MSysACEs", 1, 0x8000_0002, 0x0F00_0010)
        .catalog_entry("Active Customers", 5, 0, 0x0F00_0020)
        .catalog_entry("Main Form", 0, 0, 0x0F00_0030)
}
