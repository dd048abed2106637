use tracing::trace;

use crate::{
    MdbError,
    storage::{
        Page, PageId, PageReader, RowPointer, StorageError, StorageResult,
        format::PAGE_DATA,
        page::{le_u32, read_slice},
    },
};

/// Position of a row cursor.
#[derive(Debug, Clone)]
pub enum CursorState {
    /// Opened or rewound; nothing fetched yet.
    BeforeFirst,
    /// A row is loaded and the bound buffers hold its values.
    Positioned,
    /// The last fetch found no more rows. Stays here until rewound.
    Exhausted,
    /// A fetch failed (a value overflowed its buffer, or a row could not be
    /// decoded). Every fetch repeats the error until rewound.
    Failed(MdbError),
}

/// Forward-only walk over the data pages listed in a table's usage map.
#[derive(Debug)]
pub(crate) struct RowCursor {
    tdef_page: PageId,
    pages: Vec<PageId>,
    page_idx: usize,
    current: Option<Page>,
    row_idx: u16,
    pub state: CursorState,
}

impl RowCursor {
    pub fn new(tdef_page: PageId, pages: Vec<PageId>) -> Self {
        Self {
            tdef_page,
            pages,
            page_idx: 0,
            current: None,
            row_idx: 0,
            state: CursorState::BeforeFirst,
        }
    }

    pub fn rewind(&mut self) {
        self.page_idx = 0;
        self.current = None;
        self.row_idx = 0;
        self.state = CursorState::BeforeFirst;
    }

    /// Returns the bytes of the next live row, or `None` at the end.
    ///
    /// Pages listed in the map that are not data pages of this table are
    /// skipped, as are deleted rows. Lookup rows are followed to the row
    /// they point at.
    pub fn next_row(&mut self, reader: &PageReader) -> StorageResult<Option<Vec<u8>>> {
        let format = reader.format();

        loop {
            if self.current.is_none() {
                let Some(&id) = self.pages.get(self.page_idx) else {
                    return Ok(None);
                };
                let page = reader.read_page(id)?;
                if page.page_type() != PAGE_DATA || page.data_owner(format)? != self.tdef_page {
                    trace!(page = id, "skipping page not owned by table");
                    self.page_idx += 1;
                    continue;
                }
                self.row_idx = 0;
                self.current = Some(page);
            }
            let Some(page) = &self.current else {
                continue;
            };

            if self.row_idx >= page.row_count(format)? {
                self.current = None;
                self.page_idx += 1;
                continue;
            }

            let row = self.row_idx;
            self.row_idx += 1;

            let bounds = page.row_bounds(format, row)?;
            if bounds.deleted {
                continue;
            }

            let bytes = &page.bytes()[bounds.start..bounds.end];
            trace!(page = page.id(), row, len = bytes.len(), "fetched row");

            if bounds.lookup {
                let target = RowPointer::from_raw(le_u32(bytes, 0)?);
                return follow_lookup(reader, target).map(Some);
            }
            return Ok(Some(bytes.to_vec()));
        }
    }
}

/// Reads the row a lookup row points at. The target slot is usually
/// flagged deleted so plain scans do not see it twice.
fn follow_lookup(reader: &PageReader, target: RowPointer) -> StorageResult<Vec<u8>> {
    let format = reader.format();
    let page = reader.read_page(target.page)?;
    page.expect_type(PAGE_DATA)?;
    let bounds = page.row_bounds(format, target.row)?;

    if bounds.lookup {
        return Err(StorageError::corrupt(format!(
            "lookup row on page {} points at another lookup row",
            target.page
        )));
    }

    let table_end = format.data_row_table_offset() + usize::from(page.row_count(format)?) * 2;
    if bounds.start < table_end {
        return Err(StorageError::corrupt(format!(
            "lookup target row {} on page {} overlaps the row table",
            target.row, target.page
        )));
    }

    Ok(read_slice(page.bytes(), bounds.start, bounds.len())?.to_vec())
}
