use strum::{Display, FromRepr};

/// Index flag bits.
pub const INDEX_UNIQUE: u8 = 0x01;
pub const INDEX_IGNORE_NULLS: u8 = 0x02;
pub const INDEX_REQUIRED: u8 = 0x08;

/// Kind of a logical index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum IndexKind {
    Normal = 0,
    #[strum(to_string = "Primary Key")]
    PrimaryKey = 1,
    /// Reference side of a relationship.
    #[strum(to_string = "Foreign Key")]
    ForeignKey = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SortOrder {
    #[strum(to_string = "ASC")]
    Ascending,
    #[strum(to_string = "DESC")]
    Descending,
}

/// One key column of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexKey {
    /// 1-based column number.
    pub column_number: u16,
    pub order: SortOrder,
}

/// Definition of one index of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub number: u32,
    pub name: String,
    /// Raw index type byte.
    pub type_code: u8,
    /// Decoded kind; `None` when the type byte is not one we know.
    pub kind: Option<IndexKind>,
    pub row_count: u32,
    pub flags: u8,
    /// Key columns in key order.
    pub keys: Vec<IndexKey>,
}

impl IndexDef {
    /// Number of key columns; always equal to `keys.len()`.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_primary_key(&self) -> bool {
        self.kind == Some(IndexKind::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.flags & INDEX_UNIQUE != 0
    }

    pub fn ignores_nulls(&self) -> bool {
        self.flags & INDEX_IGNORE_NULLS != 0
    }

    pub fn is_required(&self) -> bool {
        self.flags & INDEX_REQUIRED != 0
    }
}
