use crate::core::types::ColumnType;

/// Column flag bits in a table definition entry.
pub(crate) const COLUMN_FIXED: u8 = 0x01;
pub(crate) const COLUMN_NULLABLE: u8 = 0x02;
pub(crate) const COLUMN_AUTONUMBER: u8 = 0x04;

/// Definition of a single column in a table.
///
/// Read-only metadata decoded from the table definition. The position of a
/// column in [`Table::columns`](crate::Table::columns) is its binding
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// The column name.
    pub name: String,

    /// Logical type governing how values are decoded.
    pub column_type: ColumnType,

    /// Declared size in bytes.
    pub size: u16,

    /// Precision, for Numeric/Currency/Single/Double columns; 0 otherwise.
    pub precision: u8,

    /// Scale, for Numeric/Currency/Single/Double columns; 0 otherwise.
    pub scale: u8,

    /// Whether the value lives in the fixed-width area of a row.
    pub is_fixed: bool,

    pub nullable: bool,
    pub autonumber: bool,

    /// Column number as stored; also its bit in a row's null mask.
    pub column_number: u16,

    /// Index into a row's variable-column offset table.
    pub(crate) var_column_number: u16,

    /// Offset into a row's fixed-width area.
    pub(crate) fixed_offset: u16,
}

impl ColumnDef {
    /// Raw type code, as accepted by [`type_name`](crate::type_name).
    pub fn type_code(&self) -> u8 {
        self.column_type.code()
    }

    /// Display name of the column's type.
    pub fn type_name(&self) -> &'static str {
        self.column_type.into()
    }
}

#[cfg(test)]
impl ColumnDef {
    /// A nullable column with its type's default size, numbered by the
    /// caller's position.
    pub(crate) fn new(name: &str, column_type: ColumnType) -> Self {
        let fixed = column_type.fixed_size();
        Self {
            name: name.to_string(),
            column_type,
            size: fixed.unwrap_or(255) as u16,
            precision: 0,
            scale: 0,
            is_fixed: fixed.is_some(),
            nullable: true,
            autonumber: false,
            column_number: 0,
            var_column_number: 0,
            fixed_offset: 0,
        }
    }
}
