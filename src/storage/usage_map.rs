//! Table usage maps: which pages hold a table's rows.

use super::{
    error::{StorageError, StorageResult},
    page::{PageId, PageReader, RowPointer, le_u32},
};

pub(crate) const MAP_INLINE: u8 = 0x00;
pub(crate) const MAP_REFERENCE: u8 = 0x01;

/// Bytes before the bitmap in a reference-map bitmap page.
const MAP_PAGE_HEADER: usize = 4;

/// Decodes the usage map stored at `pointer` into an ascending page list.
pub fn read_usage_map(reader: &PageReader, pointer: RowPointer) -> StorageResult<Vec<PageId>> {
    let map = reader.read_row(pointer)?;
    let Some(&map_type) = map.first() else {
        return Err(StorageError::corrupt("empty usage map"));
    };

    match map_type {
        MAP_INLINE => {
            let start = le_u32(&map, 1)?;
            collect_bits(&map[5..], start)
        }
        MAP_REFERENCE => {
            let page_size = reader.format().page_size;
            let pages_per_map = ((page_size - MAP_PAGE_HEADER) * 8) as u32;

            let mut pages = Vec::new();
            for (i, slot) in map[1..].chunks_exact(4).enumerate() {
                let map_page = u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]);
                if map_page == 0 {
                    continue;
                }
                let bitmap = reader.read_page(map_page)?;
                let first_page = (i as u32).checked_mul(pages_per_map).ok_or_else(|| {
                    StorageError::corrupt(format!("usage map slot {i} is out of range"))
                })?;
                pages.extend(collect_bits(&bitmap.bytes()[MAP_PAGE_HEADER..], first_page)?);
            }
            Ok(pages)
        }
        other => Err(StorageError::corrupt(format!(
            "unknown usage map type {other:#04x}"
        ))),
    }
}

fn collect_bits(bitmap: &[u8], first_page: PageId) -> StorageResult<Vec<PageId>> {
    let mut pages = Vec::new();
    for (byte_idx, byte) in bitmap.iter().enumerate() {
        for bit in (0..8).filter(|bit| byte & (1 << bit) != 0) {
            let page = u32::try_from(byte_idx * 8 + bit)
                .ok()
                .and_then(|offset| first_page.checked_add(offset))
                .ok_or_else(|| {
                    StorageError::corrupt(format!(
                        "usage map bit {} past start page {first_page} overflows",
                        byte_idx * 8 + bit
                    ))
                })?;
            pages.push(page);
        }
    }
    Ok(pages)
}
