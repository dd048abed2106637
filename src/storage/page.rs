use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{
    error::{StorageError, StorageResult},
    format::{
        ACE_MAGIC, JET_MAGIC, JetFormat, JetVersion, MAGIC_OFFSET, PAGE_DB_HEADER,
        ROW_DELETED_FLAG, ROW_LOOKUP_FLAG, ROW_OFFSET_MASK, VERSION_OFFSET,
    },
};
use crate::MdbError;

pub type PageId = u32;
pub type RowId = u16;

/// Location of a row: the low byte is the row number, the upper three
/// bytes the page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPointer {
    pub page: PageId,
    pub row: RowId,
}

impl RowPointer {
    pub fn from_raw(raw: u32) -> Self {
        Self {
            page: raw >> 8,
            row: (raw & 0xFF) as RowId,
        }
    }

    pub fn to_raw(self) -> u32 {
        (self.page << 8) | u32::from(self.row & 0xFF)
    }
}

/// Byte range of one row inside a data page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    /// First byte of the row.
    pub start: usize,
    /// One past the last byte of the row.
    pub end: usize,
    pub deleted: bool,
    /// The row body is a 4-byte [`RowPointer`] to the real row.
    pub lookup: bool,
}

impl RowBounds {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single page read from the file.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    data: Box<[u8]>,
}

impl Page {
    pub fn new(id: PageId, data: Box<[u8]>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn page_type(&self) -> u8 {
        self.data.first().copied().unwrap_or(0xFF)
    }

    pub fn expect_type(&self, expected: u8) -> StorageResult<()> {
        let found = self.page_type();
        if found == expected {
            Ok(())
        } else {
            Err(StorageError::UnexpectedPageType {
                page: self.id,
                expected,
                found,
            })
        }
    }

    pub fn u16_at(&self, offset: usize) -> StorageResult<u16> {
        le_u16(&self.data, offset)
    }

    pub fn u32_at(&self, offset: usize) -> StorageResult<u32> {
        le_u32(&self.data, offset)
    }

    /// Owning table-definition page of a data page.
    pub fn data_owner(&self, format: &JetFormat) -> StorageResult<PageId> {
        self.u32_at(format.data_tdef_offset)
    }

    /// Number of entries in a data page's row-offset table.
    pub fn row_count(&self, format: &JetFormat) -> StorageResult<u16> {
        self.u16_at(format.data_row_count_offset)
    }

    /// Locates a row in a data page.
    ///
    /// Rows are packed from the end of the page towards the header, so a row
    /// ends where the previous row in the offset table starts.
    pub fn row_bounds(&self, format: &JetFormat, row: RowId) -> StorageResult<RowBounds> {
        let row_count = self.row_count(format)?;
        if row >= row_count {
            return Err(StorageError::RowOutOfRange {
                page: self.id,
                row,
                row_count,
            });
        }

        let table_offset = format.data_row_table_offset();
        let raw = self.u16_at(table_offset + usize::from(row) * 2)?;
        let start = usize::from(raw & ROW_OFFSET_MASK);
        let end = if row == 0 {
            format.page_size
        } else {
            usize::from(self.u16_at(table_offset + usize::from(row - 1) * 2)? & ROW_OFFSET_MASK)
        };

        let table_end = table_offset + usize::from(row_count) * 2;
        let deleted = raw & ROW_DELETED_FLAG != 0;
        if !deleted && (start < table_end || start > end || end > self.data.len()) {
            return Err(StorageError::corrupt(format!(
                "page {}: row {} spans {}..{} outside the row area",
                self.id, row, start, end
            )));
        }

        Ok(RowBounds {
            start,
            end: end.max(start),
            deleted,
            lookup: raw & ROW_LOOKUP_FLAG != 0,
        })
    }
}

pub(crate) fn read_slice(bytes: &[u8], offset: usize, len: usize) -> StorageResult<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            StorageError::corrupt(format!(
                "read of {len} bytes at offset {offset} past end of {} bytes",
                bytes.len()
            ))
        })
}

pub(crate) fn le_u16(bytes: &[u8], offset: usize) -> StorageResult<u16> {
    let raw = read_slice(bytes, offset, 2)?;
    Ok(u16::from_le_bytes([raw[0], raw[1]]))
}

pub(crate) fn le_u32(bytes: &[u8], offset: usize) -> StorageResult<u32> {
    let raw = read_slice(bytes, offset, 4)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Read-only page access to one database file.
///
/// The file handle sits behind a lock; every read is a seek followed by a
/// full-page read, so concurrent callers never interleave.
#[derive(Debug)]
pub struct PageReader {
    file: Mutex<File>,
    version: JetVersion,
    page_count: u32,
}

impl PageReader {
    /// Opens a file and validates its header page.
    pub fn open(path: &Path) -> Result<Self, MdbError> {
        let mut file = File::open(path).map_err(|e| MdbError::open(path, e))?;
        let file_len = file
            .metadata()
            .map_err(|e| MdbError::open(path, e))?
            .len();

        let mut header = [0u8; VERSION_OFFSET + 1];
        file.read_exact(&mut header)
            .map_err(|_| MdbError::open(path, "file too short for a database header"))?;

        let version = Self::parse_header(&header).map_err(|reason| MdbError::open(path, reason))?;
        let page_size = version.format().page_size as u64;

        if file_len < page_size {
            return Err(MdbError::open(
                path,
                format!("file is {file_len} bytes, smaller than one {page_size}-byte page"),
            ));
        }

        let page_count = u32::try_from(file_len / page_size)
            .map_err(|_| MdbError::open(path, "file too large"))?;

        debug!(path = %path.display(), %version, page_count, "opened database file");

        Ok(Self {
            file: Mutex::new(file),
            version,
            page_count,
        })
    }

    fn parse_header(header: &[u8]) -> Result<JetVersion, String> {
        if header[0] != PAGE_DB_HEADER {
            return Err(format!(
                "page 0 has type {:#04x}, expected a database header",
                header[0]
            ));
        }

        let magic = &header[MAGIC_OFFSET..MAGIC_OFFSET + JET_MAGIC.len()];
        if magic != JET_MAGIC && magic != ACE_MAGIC {
            return Err("not a Jet/ACE database (bad magic)".to_string());
        }

        let code = header[VERSION_OFFSET];
        JetVersion::from_repr(code).ok_or_else(|| format!("unsupported format version {code:#04x}"))
    }

    pub fn version(&self) -> JetVersion {
        self.version
    }

    pub fn format(&self) -> &'static JetFormat {
        self.version.format()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn read_page(&self, id: PageId) -> StorageResult<Page> {
        if id >= self.page_count {
            return Err(StorageError::PageOutOfRange {
                page: id,
                page_count: self.page_count,
            });
        }

        let page_size = self.format().page_size;
        let mut data = vec![0u8; page_size].into_boxed_slice();
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(u64::from(id) * page_size as u64))?;
            file.read_exact(&mut data)?;
        }

        trace!(page = id, "read page");
        Ok(Page::new(id, data))
    }

    /// Copies out the bytes of the row a pointer refers to.
    ///
    /// Used for structures stored as rows of other pages: usage maps and
    /// long values.
    pub fn read_row(&self, pointer: RowPointer) -> StorageResult<Vec<u8>> {
        let page = self.read_page(pointer.page)?;
        let bounds = page.row_bounds(self.format(), pointer.row)?;
        if bounds.deleted {
            return Err(StorageError::corrupt(format!(
                "row {} on page {} is deleted",
                pointer.row, pointer.page
            )));
        }
        Ok(page.bytes()[bounds.start..bounds.end].to_vec())
    }
}
