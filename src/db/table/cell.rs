use std::fmt::{self, Write};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, format::StrftimeItems};

use super::{column_def::ColumnDef, schema::FieldSlice};
use crate::{
    core::types::ColumnType,
    storage::{PageReader, StorageError, StorageResult, long_value::read_long_value, text::decode_text},
};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MONEY_SCALE: u64 = 10_000;
const NUMERIC_NEGATIVE: u8 = 0x80;

/// One decoded column value of the current row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Single(f32),
    Double(f64),
    /// Currency, scaled by 10 000.
    Money(i64),
    /// Days since 1899-12-30.
    DateTime(f64),
    Text(String),
    Binary(Vec<u8>),
    Guid([u8; 16]),
    Numeric {
        negative: bool,
        magnitude: u128,
        scale: u8,
    },
}

/// Decodes one column of a cracked row.
pub(crate) fn decode_cell(
    column: &ColumnDef,
    field: &FieldSlice,
    row: &[u8],
    reader: &PageReader,
) -> StorageResult<Cell> {
    if column.column_type == ColumnType::Bool {
        return Ok(Cell::Bool(field.present));
    }

    let Some(range) = field.range.clone().filter(|_| field.present) else {
        return Ok(Cell::Null);
    };
    let bytes = &row[range];

    if let Some(width) = column.column_type.fixed_size()
        && bytes.len() < width
    {
        return Err(StorageError::corrupt(format!(
            "column {} holds {} bytes, {} needs {width}",
            column.name,
            bytes.len(),
            column.column_type
        )));
    }

    let unicode = reader.format().unicode_text;
    let cell = match column.column_type {
        ColumnType::Bool => Cell::Bool(field.present),
        ColumnType::Byte => Cell::Int(i64::from(bytes[0])),
        ColumnType::Int => Cell::Int(i64::from(i16::from_le_bytes([bytes[0], bytes[1]]))),
        ColumnType::LongInt | ColumnType::Complex => Cell::Int(i64::from(i32::from_le_bytes(array(bytes)))),
        ColumnType::BigInt => Cell::Int(i64::from_le_bytes(array(bytes))),
        ColumnType::Money => Cell::Money(i64::from_le_bytes(array(bytes))),
        ColumnType::Float => Cell::Single(f32::from_le_bytes(array(bytes))),
        ColumnType::Double => Cell::Double(f64::from_le_bytes(array(bytes))),
        ColumnType::DateTime => Cell::DateTime(f64::from_le_bytes(array(bytes))),
        ColumnType::RepId => Cell::Guid(array(bytes)),
        ColumnType::Numeric => {
            let magnitude = bytes[1..17]
                .chunks_exact(4)
                .fold(0u128, |acc, word| {
                    (acc << 32) | u128::from(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
                });
            Cell::Numeric {
                negative: bytes[0] & NUMERIC_NEGATIVE != 0,
                magnitude,
                scale: column.scale,
            }
        }
        ColumnType::Text => Cell::Text(decode_text(bytes, unicode)),
        ColumnType::Binary => Cell::Binary(bytes.to_vec()),
        ColumnType::Memo => Cell::Text(decode_text(&read_long_value(reader, bytes)?, unicode)),
        ColumnType::Ole => Cell::Binary(read_long_value(reader, bytes)?),
    };

    Ok(cell)
}

/// First `N` bytes of a slice already checked to be long enough.
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Integer value, for catalog columns.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Writes the display text of the value.
    ///
    /// Numbers render in a form that parses back to the same value, so the
    /// query engine can rebuild typed values from bound text.
    pub fn render<W: Write>(&self, out: &mut W, date_format: &str) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => out.write_str(if *b { "1" } else { "0" }),
            Cell::Int(i) => write!(out, "{i}"),
            Cell::Single(f) => write!(out, "{f}"),
            Cell::Double(f) => write!(out, "{f}"),
            Cell::Money(raw) => {
                let sign = if *raw < 0 { "-" } else { "" };
                let abs = raw.unsigned_abs();
                write!(out, "{sign}{}.{:04}", abs / MONEY_SCALE, abs % MONEY_SCALE)
            }
            Cell::DateTime(days) => match ole_date(*days) {
                Some(date) => write!(out, "{}", date.format_with_items(StrftimeItems::new(date_format))),
                None => write!(out, "{days}"),
            },
            Cell::Text(s) => out.write_str(s),
            Cell::Binary(bytes) => bytes.iter().try_for_each(|b| write!(out, "{b:02X}")),
            Cell::Guid(g) => write!(
                out,
                "{{{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
                g[3], g[2], g[1], g[0], g[5], g[4], g[7], g[6], g[8], g[9], g[10], g[11], g[12], g[13],
                g[14], g[15]
            ),
            Cell::Numeric {
                negative,
                magnitude,
                scale,
            } => {
                if *negative && *magnitude != 0 {
                    out.write_char('-')?;
                }
                let digits = magnitude.to_string();
                let scale = usize::from(*scale);
                if scale == 0 {
                    return out.write_str(&digits);
                }
                let padded = format!("{digits:0>width$}", width = scale + 1);
                let (int, frac) = padded.split_at(padded.len() - scale);
                write!(out, "{int}.{frac}")
            }
        }
    }
}

/// Converts an OLE automation date. The integer part counts days from
/// 1899-12-30 (negative before it); the fraction is always the time of day.
fn ole_date(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }

    let whole = days.trunc();
    let seconds = ((days - whole).abs() * SECONDS_PER_DAY).round();

    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_days(whole as i64)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds as i64)?)
}

/// Checks that a `strftime` pattern is usable before any value is rendered
/// with it.
pub(crate) fn validate_date_format(format: &str) -> Result<(), String> {
    use chrono::format::Item;

    match StrftimeItems::new(format).find(|item| matches!(item, Item::Error)) {
        Some(_) => Err(format!("invalid date format {format:?}")),
        None => Ok(()),
    }
}
