use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::DboError;

/// Values read from a result row or handed to the value encoder.
///
/// The same enum is used in both directions so a fetched value can be fed straight back
/// into `value()`:
/// ```rust
/// use dbo_mysql::prelude::*;
///
/// let values = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Textual form of a scalar value, the way the text protocol would deliver it.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(f.to_string()),
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            RowValues::Timestamp(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            RowValues::Blob(bytes) => String::from_utf8(bytes.clone()).ok(),
            RowValues::JSON(json) => Some(json.to_string()),
            RowValues::Null => None,
        }
    }
}

/// Declared column type of the target column, as the model layer describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    String,
    Text,
    Date,
    Datetime,
    Timestamp,
    Time,
    Binary,
}

impl ColumnType {
    /// Types for which an empty string means NULL rather than `''`.
    #[must_use]
    pub fn is_numeric_or_boolean(self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Float | ColumnType::Boolean
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Time => "time",
            ColumnType::Binary => "binary",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = DboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" => Ok(ColumnType::Boolean),
            "integer" => Ok(ColumnType::Integer),
            "float" => Ok(ColumnType::Float),
            "string" => Ok(ColumnType::String),
            "text" => Ok(ColumnType::Text),
            "date" => Ok(ColumnType::Date),
            "datetime" => Ok(ColumnType::Datetime),
            "timestamp" => Ok(ColumnType::Timestamp),
            "time" => Ok(ColumnType::Time),
            "binary" => Ok(ColumnType::Binary),
            other => Err(DboError::ConfigError(format!(
                "unknown column type: {other}"
            ))),
        }
    }
}

/// Server version as reported in the handshake, comparable component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl ServerVersion {
    /// First server with subquery/alias support the model layer relies on.
    pub const ALIASES: ServerVersion = ServerVersion::new(4, 1, 0);
    /// First server exposing `INFORMATION_SCHEMA`.
    pub const INFORMATION_SCHEMA: ServerVersion = ServerVersion::new(5, 0, 0);
    /// First server without the `NO_AUTO_CREATE_USER` SQL mode.
    pub const NO_AUTO_CREATE_USER_REMOVED: ServerVersion = ServerVersion::new(8, 0, 0);

    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl From<(u16, u16, u16)> for ServerVersion {
    fn from((major, minor, patch): (u16, u16, u16)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_order_numerically() {
        assert!(ServerVersion::new(5, 7, 44) < ServerVersion::NO_AUTO_CREATE_USER_REMOVED);
        assert!(ServerVersion::new(8, 0, 0) >= ServerVersion::NO_AUTO_CREATE_USER_REMOVED);
        assert!(ServerVersion::new(4, 0, 30) < ServerVersion::ALIASES);
        assert!(ServerVersion::new(10, 2, 0) > ServerVersion::INFORMATION_SCHEMA);
    }

    #[test]
    fn column_type_round_trips_names() {
        assert_eq!("Integer".parse::<ColumnType>().unwrap(), ColumnType::Integer);
        assert_eq!(ColumnType::Datetime.to_string(), "datetime");
        assert!("money".parse::<ColumnType>().is_err());
    }
}
