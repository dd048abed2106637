use std::ops::Range;

use super::column_def::ColumnDef;
use crate::{
    db::null_bitmap::NullBitmap,
    storage::{JetFormat, StorageError, StorageResult, page::le_u16},
};

/// The ordered columns of a table.
///
/// Column order is fixed when the table definition is loaded and defines
/// the positions used by bindings and by [`Row`](super::row::Row) values.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// The ordered list of column definitions.
    pub columns: Vec<ColumnDef>,

    /// Number of variable-width columns declared by the table.
    pub(crate) var_column_count: u16,
}

/// Where one column's bytes sit inside a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldSlice {
    /// Byte range within the row; `None` when the row has no data for it.
    pub range: Option<Range<usize>>,
    /// The column's null-mask bit.
    pub present: bool,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>, var_column_count: u16) -> Self {
        Self {
            columns,
            var_column_count,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Finds the index of a column by name.
    ///
    /// An exact match wins; otherwise names are compared ignoring ASCII case,
    /// as Access does.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|col| col.name.eq_ignore_ascii_case(name))
            })
    }

    /// Splits a row into per-column byte ranges.
    ///
    /// Layout, front to back: column count, fixed-width area, variable data,
    /// variable-column offset table (stored back to front), variable column
    /// count, null mask. Rows written before a column was added simply have
    /// fewer columns; those columns come back absent.
    pub(crate) fn crack_row(&self, row: &[u8], format: &JetFormat) -> StorageResult<Vec<FieldSlice>> {
        let count_size = format.row_count_size;
        let row_cols = if count_size == 1 {
            usize::from(*row.first().ok_or_else(|| StorageError::corrupt("empty row"))?)
        } else {
            usize::from(le_u16(row, 0)?)
        };

        let mask = NullBitmap::from_row_tail(row, row_cols)?;
        let mask_size = mask.bytes.len();

        let var_offsets = if self.var_column_count > 0 {
            if count_size == 1 {
                Self::jet3_var_offsets(row, mask_size)?
            } else {
                Self::jet4_var_offsets(row, mask_size)?
            }
        } else {
            Vec::new()
        };
        let row_var_cols = var_offsets.len().saturating_sub(1);
        let row_fixed_cols = row_cols.saturating_sub(row_var_cols);

        let mut fixed_found = 0;
        let mut fields = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let present = mask.is_set(usize::from(column.column_number));
            let var_index = usize::from(column.var_column_number);

            let range = if column.is_fixed && fixed_found < row_fixed_cols {
                fixed_found += 1;
                let start = count_size + usize::from(column.fixed_offset);
                Some(start..start + usize::from(column.size))
            } else if !column.is_fixed && var_index < row_var_cols {
                Some(var_offsets[var_index]..var_offsets[var_index + 1])
            } else {
                None
            };

            if let Some(range) = &range
                && (range.start > range.end || range.end > row.len() - mask_size)
            {
                return Err(StorageError::corrupt(format!(
                    "column {} spans {}..{} in a {}-byte row",
                    column.name,
                    range.start,
                    range.end,
                    row.len()
                )));
            }

            fields.push(FieldSlice {
                present: present && range.is_some(),
                range,
            });
        }

        Ok(fields)
    }

    /// Jet 4: 16-bit variable column count right before the mask, then
    /// 16-bit offsets walking backwards.
    fn jet4_var_offsets(row: &[u8], mask_size: usize) -> StorageResult<Vec<usize>> {
        let count_at = row
            .len()
            .checked_sub(mask_size + 2)
            .ok_or_else(|| StorageError::corrupt("row too short for variable column count"))?;
        let row_var_cols = usize::from(le_u16(row, count_at)?);

        (0..=row_var_cols)
            .map(|i| {
                let at = count_at.checked_sub(2 + i * 2).ok_or_else(|| {
                    StorageError::corrupt("variable column offsets run past row start")
                })?;
                le_u16(row, at).map(usize::from)
            })
            .collect()
    }

    /// Jet 3: 8-bit offsets. Rows longer than 256 bytes carry a jump table
    /// whose entries say at which variable column the next 256-byte block
    /// begins.
    fn jet3_var_offsets(row: &[u8], mask_size: usize) -> StorageResult<Vec<usize>> {
        let short = || StorageError::corrupt("row too short for variable column table");
        let row_end = row.len().checked_sub(1).ok_or_else(short)?;
        let count_at = row_end.checked_sub(mask_size).ok_or_else(short)?;
        let row_var_cols = usize::from(row[count_at]);

        let mut num_jumps = row_end / 256;
        let col_ptr = count_at.checked_sub(num_jumps + 1).ok_or_else(short)?;
        if col_ptr.saturating_sub(row_var_cols) / 256 < num_jumps {
            num_jumps -= 1;
        }

        let mut jumps_used = 0;
        let mut offsets = Vec::with_capacity(row_var_cols + 1);
        for i in 0..=row_var_cols {
            while jumps_used < num_jumps && usize::from(row[count_at - jumps_used - 1]) == i {
                jumps_used += 1;
            }
            let at = col_ptr.checked_sub(i).ok_or_else(short)?;
            offsets.push(usize::from(row[at]) + jumps_used * 256);
        }

        Ok(offsets)
    }
}
