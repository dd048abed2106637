//! Memo and OLE values stored outside the row ("LVAL" data).

use super::{
    error::{StorageError, StorageResult},
    page::{PageReader, RowPointer, le_u32},
};

/// Size of the in-row header of a memo or OLE field.
pub const LONG_VALUE_HEADER: usize = 12;

const INLINE_FLAG: u32 = 0x8000_0000;
const SINGLE_PAGE_FLAG: u32 = 0x4000_0000;
const LENGTH_MASK: u32 = 0x3FFF_FFFF;

/// Reads the full value a memo/OLE field refers to.
pub fn read_long_value(reader: &PageReader, field: &[u8]) -> StorageResult<Vec<u8>> {
    let raw_len = le_u32(field, 0)?;
    let len = (raw_len & LENGTH_MASK) as usize;
    let pointer = RowPointer::from_raw(le_u32(field, 4)?);

    match raw_len & !LENGTH_MASK {
        INLINE_FLAG => {
            let data = field.get(LONG_VALUE_HEADER..LONG_VALUE_HEADER + len).ok_or_else(|| {
                StorageError::corrupt(format!("inline long value of {len} bytes is truncated"))
            })?;
            Ok(data.to_vec())
        }
        SINGLE_PAGE_FLAG => {
            let mut row = reader.read_row(pointer)?;
            if row.len() < len {
                return Err(StorageError::corrupt(format!(
                    "long value row holds {} bytes, header says {len}",
                    row.len()
                )));
            }
            row.truncate(len);
            Ok(row)
        }
        0 => read_chain(reader, pointer, len),
        flags => Err(StorageError::corrupt(format!(
            "invalid long value flags {flags:#010x}"
        ))),
    }
}

/// Follows a chain of long-value rows; each row starts with the pointer to
/// the next one.
fn read_chain(reader: &PageReader, mut pointer: RowPointer, len: usize) -> StorageResult<Vec<u8>> {
    let mut data = Vec::with_capacity(len);
    let mut hops = 0u32;

    while data.len() < len {
        if hops > reader.page_count().saturating_mul(256) {
            return Err(StorageError::corrupt("long value chain does not terminate"));
        }
        hops += 1;

        let row = reader.read_row(pointer)?;
        let next = le_u32(&row, 0)?;
        data.extend_from_slice(&row[4..]);

        if next == 0 {
            break;
        }
        pointer = RowPointer::from_raw(next);
    }

    if data.len() < len {
        return Err(StorageError::corrupt(format!(
            "long value chain ended after {} of {len} bytes",
            data.len()
        )));
    }

    data.truncate(len);
    Ok(data)
}

/// Builds the in-row header of an inline long value.
#[cfg(test)]
pub(crate) fn inline_header(len: usize) -> [u8; LONG_VALUE_HEADER] {
    let mut header = [0u8; LONG_VALUE_HEADER];
    header[0..4].copy_from_slice(&(len as u32 | INLINE_FLAG).to_le_bytes());
    header
}

/// Builds the in-row header of a long value spread over a chain of rows
/// starting at `pointer`.
#[cfg(test)]
pub(crate) fn chained_header(len: usize, pointer: RowPointer) -> [u8; LONG_VALUE_HEADER] {
    let mut header = [0u8; LONG_VALUE_HEADER];
    header[0..4].copy_from_slice(&(len as u32).to_le_bytes());
    header[4..8].copy_from_slice(&pointer.to_raw().to_le_bytes());
    header
}

/// Builds the in-row header of a long value stored in a single row elsewhere.
#[cfg(test)]
pub(crate) fn single_page_header(len: usize, pointer: RowPointer) -> [u8; LONG_VALUE_HEADER] {
    let mut header = [0u8; LONG_VALUE_HEADER];
    header[0..4].copy_from_slice(&(len as u32 | SINGLE_PAGE_FLAG).to_le_bytes());
    header[4..8].copy_from_slice(&pointer.to_raw().to_le_bytes());
    header
}
