//! On-disk constants for the Jet 3 and Jet 4 page layouts.
//!
//! Every offset the readers use is listed here, once per format family, so
//! no other module hard-codes a position inside a page.

use strum::{Display, FromRepr};

/// Magic strings found at offset 4 of the header page.
pub const JET_MAGIC: &[u8] = b"Standard Jet DB";
pub const ACE_MAGIC: &[u8] = b"Standard ACE DB";

/// Offset of the magic string on page 0.
pub const MAGIC_OFFSET: usize = 4;

/// Offset of the version byte on page 0.
pub const VERSION_OFFSET: usize = 0x14;

/// Table-definition page of the system catalog table.
pub const CATALOG_TDEF_PAGE: u32 = 2;

/// Page type bytes.
pub const PAGE_DB_HEADER: u8 = 0x00;
pub const PAGE_DATA: u8 = 0x01;
pub const PAGE_TABLE_DEF: u8 = 0x02;

/// Row-offset flags and mask.
pub const ROW_DELETED_FLAG: u16 = 0x8000;
pub const ROW_LOOKUP_FLAG: u16 = 0x4000;
pub const ROW_OFFSET_MASK: u16 = 0x1FFF;

/// Bytes in the header that starts each table-definition continuation page.
pub const TDEF_PAGE_HEADER: usize = 8;
pub const TDEF_NEXT_PAGE_OFFSET: usize = 4;

/// Maximum key columns stored per real index.
pub const MAX_INDEX_COLUMNS: usize = 10;

/// Format version byte of the header page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum JetVersion {
    #[strum(to_string = "Jet 3")]
    Jet3 = 0,
    #[strum(to_string = "Jet 4")]
    Jet4 = 1,
    #[strum(to_string = "ACE 12")]
    Ace12 = 2,
    #[strum(to_string = "ACE 14")]
    Ace14 = 3,
    #[strum(to_string = "ACE 15")]
    Ace15 = 4,
    #[strum(to_string = "ACE 16")]
    Ace16 = 5,
}

impl JetVersion {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_jet3(self) -> bool {
        matches!(self, Self::Jet3)
    }

    /// Page layout constants for this version.
    pub fn format(self) -> &'static JetFormat {
        if self.is_jet3() { &JET3 } else { &JET4 }
    }
}

/// Layout constants for one format family.
#[derive(Debug, PartialEq, Eq)]
pub struct JetFormat {
    pub page_size: usize,

    /// Data pages
    pub data_tdef_offset: usize,
    pub data_row_count_offset: usize,

    /// Table definition
    pub tab_num_rows_offset: usize,
    pub tab_type_offset: usize,
    pub tab_num_var_cols_offset: usize,
    pub tab_num_cols_offset: usize,
    pub tab_num_idxs_offset: usize,
    pub tab_num_ridxs_offset: usize,
    pub tab_usage_map_offset: usize,
    pub tab_free_map_offset: usize,
    pub tab_cols_start_offset: usize,
    pub tab_ridx_entry_size: usize,
    pub tab_ridx_rows_offset: usize,

    /// Column entries
    pub col_entry_size: usize,
    pub col_num_offset: usize,
    pub col_var_offset: usize,
    pub col_row_num_offset: usize,
    pub col_prec_offset: usize,
    pub col_scale_offset: usize,
    pub col_flags_offset: usize,
    pub col_fixed_offset: usize,
    pub col_size_offset: usize,

    /// Width of the length prefix before column and index names.
    pub name_len_size: usize,

    /// Real index definitions (key columns) and logical index entries.
    pub ridx_def_prefix: usize,
    pub ridx_def_size: usize,
    pub lidx_entry_size: usize,
    pub lidx_num_offset: usize,
    pub lidx_real_num_offset: usize,
    pub lidx_type_offset: usize,

    /// Width of the column counts in a row header and trailer.
    pub row_count_size: usize,

    pub unicode_text: bool,
}

pub static JET3: JetFormat = JetFormat {
    page_size: 2048,

    data_tdef_offset: 4,
    data_row_count_offset: 8,

    tab_num_rows_offset: 12,
    tab_type_offset: 20,
    tab_num_var_cols_offset: 23,
    tab_num_cols_offset: 25,
    tab_num_idxs_offset: 27,
    tab_num_ridxs_offset: 31,
    tab_usage_map_offset: 35,
    tab_free_map_offset: 39,
    tab_cols_start_offset: 43,
    tab_ridx_entry_size: 8,
    tab_ridx_rows_offset: 0,

    col_entry_size: 18,
    col_num_offset: 1,
    col_var_offset: 3,
    col_row_num_offset: 5,
    col_prec_offset: 9,
    col_scale_offset: 10,
    col_flags_offset: 13,
    col_fixed_offset: 14,
    col_size_offset: 16,

    name_len_size: 1,

    ridx_def_prefix: 0,
    ridx_def_size: 39,
    lidx_entry_size: 20,
    lidx_num_offset: 0,
    lidx_real_num_offset: 4,
    lidx_type_offset: 19,

    row_count_size: 1,

    unicode_text: false,
};

pub static JET4: JetFormat = JetFormat {
    page_size: 4096,

    data_tdef_offset: 4,
    data_row_count_offset: 12,

    tab_num_rows_offset: 16,
    tab_type_offset: 40,
    tab_num_var_cols_offset: 43,
    tab_num_cols_offset: 45,
    tab_num_idxs_offset: 47,
    tab_num_ridxs_offset: 51,
    tab_usage_map_offset: 55,
    tab_free_map_offset: 59,
    tab_cols_start_offset: 63,
    tab_ridx_entry_size: 12,
    tab_ridx_rows_offset: 4,

    col_entry_size: 25,
    col_num_offset: 5,
    col_var_offset: 7,
    col_row_num_offset: 9,
    col_prec_offset: 11,
    col_scale_offset: 12,
    col_flags_offset: 15,
    col_fixed_offset: 21,
    col_size_offset: 23,

    name_len_size: 2,

    ridx_def_prefix: 4,
    ridx_def_size: 52,
    lidx_entry_size: 28,
    lidx_num_offset: 4,
    lidx_real_num_offset: 8,
    lidx_type_offset: 23,

    row_count_size: 2,

    unicode_text: true,
};

impl JetFormat {
    /// Offset of the first entry in a data page's row-offset table.
    pub fn data_row_table_offset(&self) -> usize {
        self.data_row_count_offset + 2
    }
}
