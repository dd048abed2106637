use crate::storage::{StorageError, StorageResult};

/// The null mask stored at the end of every row.
///
/// One bit per column number; a set bit means the column has a value. For
/// Boolean columns the bit is the value itself.
#[derive(Debug, Clone, Copy)]
pub struct NullBitmap<'a> {
    pub bytes: &'a [u8],
}

impl<'a> NullBitmap<'a> {
    /// Bytes needed for a mask covering `num_columns` columns.
    pub fn size_for(num_columns: usize) -> usize {
        num_columns.div_ceil(8)
    }

    /// Takes the mask from the tail of a row.
    pub fn from_row_tail(row: &'a [u8], num_columns: usize) -> StorageResult<Self> {
        let size = Self::size_for(num_columns);
        if row.len() < size {
            return Err(StorageError::corrupt(format!(
                "row of {} bytes too short for a {size}-byte null mask",
                row.len()
            )));
        }

        Ok(Self {
            bytes: &row[row.len() - size..],
        })
    }

    /// Whether the column has a value. Columns past the end of the mask
    /// (added after the row was written) have none.
    pub fn is_set(&self, column_number: usize) -> bool {
        let byte_idx = column_number / 8;
        let bit_idx = column_number % 8;
        match self.bytes.get(byte_idx) {
            Some(byte) => byte & (1 << bit_idx) != 0,
            None => false,
        }
    }

    /// Builds a mask for the given per-column presence flags.
    #[cfg(test)]
    pub(crate) fn encode(present: &[bool]) -> Vec<u8> {
        let mut bytes = vec![0u8; Self::size_for(present.len())];
        for (index, _) in present.iter().enumerate().filter(|(_, set)| **set) {
            bytes[index / 8] |= 1 << (index % 8);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_from_row_tail() {
        let row = [0xAA, 0xBB, 0b0000_0101, 0b0000_0001];
        let mask = NullBitmap::from_row_tail(&row, 9).expect("mask");

        assert_eq!(mask.bytes, &[0b0000_0101, 0b0000_0001]);
        assert!(mask.is_set(0));
        assert!(!mask.is_set(1));
        assert!(mask.is_set(2));
        assert!(mask.is_set(8));
        assert!(!mask.is_set(20));
    }

    #[test]
    fn test_mask_too_short() {
        assert!(NullBitmap::from_row_tail(&[0x01], 16).is_err());
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            NullBitmap::encode(&[true, false, true, false, false, false, false, false, true]),
            vec![0b0000_0101, 0b0000_0001]
        );
    }
}
