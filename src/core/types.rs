use strum::{Display, FromRepr, IntoStaticStr};

/// Logical column types of the Jet format.
///
/// The set is closed: a type code outside it makes the table definition
/// unreadable rather than decoding as something arbitrary. Display names
/// are the ones Access shows in its table designer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum ColumnType {
    /// Yes/No. Stored in the row's null mask, not in the fixed area.
    #[strum(serialize = "Boolean")]
    Bool = 0x01,
    #[strum(serialize = "Byte")]
    Byte = 0x02,
    /// 16-bit signed integer.
    #[strum(serialize = "Integer")]
    Int = 0x03,
    /// 32-bit signed integer.
    #[strum(serialize = "Long Integer")]
    LongInt = 0x04,
    /// 64-bit integer scaled by 10 000.
    #[strum(serialize = "Currency")]
    Money = 0x05,
    #[strum(serialize = "Single")]
    Float = 0x06,
    #[strum(serialize = "Double")]
    Double = 0x07,
    /// Days since 1899-12-30 as a double; the fraction is the time of day.
    #[strum(serialize = "DateTime")]
    DateTime = 0x08,
    #[strum(serialize = "Binary")]
    Binary = 0x09,
    #[strum(serialize = "Text")]
    Text = 0x0A,
    #[strum(serialize = "OLE")]
    Ole = 0x0B,
    #[strum(serialize = "Memo")]
    Memo = 0x0C,
    /// 16-byte GUID.
    #[strum(serialize = "Replication ID")]
    RepId = 0x0F,
    /// Sign byte followed by a 128-bit magnitude.
    #[strum(serialize = "Numeric")]
    Numeric = 0x10,
    /// Reference into a hidden attachment/multi-value table.
    #[strum(serialize = "Complex")]
    Complex = 0x12,
    #[strum(serialize = "Big Integer")]
    BigInt = 0x13,
}

impl ColumnType {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Width in the fixed area of a row, or `None` for variable-width types.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            ColumnType::Bool => Some(0),
            ColumnType::Byte => Some(1),
            ColumnType::Int => Some(2),
            ColumnType::LongInt | ColumnType::Float | ColumnType::Complex => Some(4),
            ColumnType::Money | ColumnType::Double | ColumnType::DateTime | ColumnType::BigInt => {
                Some(8)
            }
            ColumnType::RepId => Some(16),
            ColumnType::Numeric => Some(17),
            ColumnType::Binary | ColumnType::Text | ColumnType::Ole | ColumnType::Memo => None,
        }
    }

    /// Memo and OLE values live outside the row behind a 12-byte header.
    pub fn is_long_value(self) -> bool {
        matches!(self, ColumnType::Memo | ColumnType::Ole)
    }

    /// Whether precision and scale are meaningful for this type.
    pub fn has_precision(self) -> bool {
        matches!(
            self,
            ColumnType::Numeric | ColumnType::Money | ColumnType::Float | ColumnType::Double
        )
    }

    /// SQL type used when the query engine evaluates predicates.
    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::Bool => DataType::Bool,
            ColumnType::Byte
            | ColumnType::Int
            | ColumnType::LongInt
            | ColumnType::Complex
            | ColumnType::BigInt => DataType::Int64,
            ColumnType::Money | ColumnType::Float | ColumnType::Double | ColumnType::Numeric => {
                DataType::Float64
            }
            ColumnType::DateTime
            | ColumnType::Binary
            | ColumnType::Text
            | ColumnType::Ole
            | ColumnType::Memo
            | ColumnType::RepId => DataType::Text,
        }
    }
}

/// Display name of a column type code.
///
/// Unknown codes give an empty name, so listing metadata never fails on
/// types added by newer Access versions.
///
/// # Example
///
/// ```
/// assert_eq!(jetsql::type_name(0x04), "Long Integer");
/// assert_eq!(jetsql::type_name(0x0d), "");
/// ```
pub fn type_name(code: u8) -> &'static str {
    ColumnType::from_repr(code).map(<&'static str>::from).unwrap_or("")
}

/// SQL data types the query engine works with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,

    /// 64-bit floating point number.
    Float64,

    /// UTF-8 text.
    Text,

    /// Boolean true/false value.
    Bool,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int64 => write!(f, "Integer"),
            DataType::Text => write!(f, "String"),
            DataType::Bool => write!(f, "Boolean"),
            DataType::Float64 => write!(f, "Float"),
        }
    }
}

impl DataType {
    /// If two types are able to coerced
    pub fn can_coerce(from: DataType, to: DataType) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64)
        )
    }
}

/// A scalar value inside the query engine.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int64(i64),

    /// A 64-bit floating point number.
    Float64(f64),

    /// A UTF-8 text string.
    Text(String),

    /// A boolean value (true/false).
    Bool(bool),

    /// Represents a NULL value (absence of data).
    Null,
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int64(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Value::Float64(fl) => write!(f, "{}", fl),
            Value::Null => write!(f, ""),
        }
    }
}

impl Value {
    /// Rebuilds a typed value from a binding's display text.
    ///
    /// Text that does not parse as the column's type becomes [`Value::Null`];
    /// the cursor renders numbers in a form that always parses back.
    pub fn from_bound(data_type: DataType, text: Option<&str>) -> Value {
        let Some(text) = text else {
            return Value::Null;
        };

        match data_type {
            DataType::Int64 => text.parse().map(Value::Int64).unwrap_or(Value::Null),
            DataType::Float64 => text.parse().map(Value::Float64).unwrap_or(Value::Null),
            DataType::Bool => Value::Bool(text != "0"),
            DataType::Text => Value::Text(text.to_owned()),
        }
    }

    /// Returns the data type of this value, `None` for NULL.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Text(_) => Some(DataType::Text),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Null => None,
        }
    }
}
