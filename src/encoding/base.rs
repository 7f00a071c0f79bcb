use std::fmt::Write;

use crate::types::{ColumnType, RowValues};

/// Literals every SQL backend writes the same way.
///
/// Returns `None` when the value needs backend-specific handling (strings, numbers,
/// booleans, NULL), in which case the backend encoder takes over.
#[must_use]
pub fn common_literal(data: &RowValues, column: Option<ColumnType>) -> Option<String> {
    match data {
        RowValues::Timestamp(dt) => {
            let format = match column {
                Some(ColumnType::Date) => "%Y-%m-%d",
                Some(ColumnType::Time) => "%H:%M:%S",
                _ => "%Y-%m-%d %H:%M:%S",
            };
            Some(format!("'{}'", dt.format(format)))
        }
        RowValues::Blob(bytes) => Some(hex_literal(bytes)),
        RowValues::Float(f) if !f.is_finite() => Some("NULL".to_string()),
        _ => None,
    }
}

/// `X'..'` hexadecimal literal for binary data.
#[must_use]
pub fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out.push('\'');
    out
}
