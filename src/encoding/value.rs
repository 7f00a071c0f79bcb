use std::borrow::Cow;

use serde_json::Value as JsonValue;

use super::base::common_literal;
use super::escape::quote_string;
use super::numeric::{format_float, is_plain_number, normalize_decimal};
use crate::types::{ColumnType, RowValues};

/// Strings longer than this are inferred as `text` rather than `string`.
const STRING_INFERENCE_LIMIT: usize = 255;

/// Turns values into MySQL literal text.
///
/// The encoder carries the two pieces of session state that change how literals are
/// written: whether `NO_BACKSLASH_ESCAPES` is active, and the host's decimal separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueEncoder {
    no_backslash_escapes: bool,
    decimal_separator: char,
}

impl Default for ValueEncoder {
    fn default() -> Self {
        Self {
            no_backslash_escapes: false,
            decimal_separator: '.',
        }
    }
}

impl ValueEncoder {
    #[must_use]
    pub fn new(no_backslash_escapes: bool, decimal_separator: char) -> Self {
        Self {
            no_backslash_escapes,
            decimal_separator,
        }
    }

    #[must_use]
    pub fn no_backslash_escapes(&self) -> bool {
        self.no_backslash_escapes
    }

    /// Canonical boolean literal.
    #[must_use]
    pub fn boolean(value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    /// Escape and single-quote a string.
    #[must_use]
    pub fn quote(&self, text: &str) -> String {
        quote_string(text, self.no_backslash_escapes)
    }

    /// Encode `data` as a SQL literal.
    ///
    /// `column` is the declared type of the target column. When it is `None` the type is
    /// inferred from the value; `infer_numeric` additionally lets a numeric-looking string
    /// infer as a number (and so go out unquoted) instead of as a string.
    ///
    /// ```rust
    /// use dbo_mysql::prelude::*;
    ///
    /// let enc = ValueEncoder::default();
    /// assert_eq!(enc.value(&RowValues::Bool(true), None, false), "1");
    /// assert_eq!(enc.value(&RowValues::Text("".into()), Some(ColumnType::Integer), false), "NULL");
    /// assert_eq!(enc.value(&RowValues::Text("0123".into()), Some(ColumnType::Integer), false), "'0123'");
    /// ```
    #[must_use]
    pub fn value(&self, data: &RowValues, column: Option<ColumnType>, infer_numeric: bool) -> String {
        let flattened = flatten_json(data);
        let data: &RowValues = &flattened;

        if let Some(literal) = common_literal(data, column) {
            return literal;
        }

        if data.is_null() {
            return "NULL".to_string();
        }

        if let RowValues::Text(text) = data
            && text.is_empty()
            && !column.is_some_and(ColumnType::is_numeric_or_boolean)
        {
            return "''".to_string();
        }

        let column = column.unwrap_or_else(|| self.infer(data, infer_numeric));

        match column {
            ColumnType::Boolean => Self::boolean(truthy(data)).to_string(),
            ColumnType::Integer | ColumnType::Float => self.numeric(data),
            _ => self.quote_value(data),
        }
    }

    /// Encode each value with the same declared type.
    #[must_use]
    pub fn values(&self, data: &[RowValues], column: Option<ColumnType>) -> Vec<String> {
        data.iter()
            .map(|value| self.value(value, column, false))
            .collect()
    }

    fn numeric(&self, data: &RowValues) -> String {
        match data {
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => format_float(*f).unwrap_or_else(|| "NULL".to_string()),
            RowValues::Bool(b) => Self::boolean(*b).to_string(),
            RowValues::Text(text) if text.is_empty() => "NULL".to_string(),
            RowValues::Text(text) => {
                let normalized = normalize_decimal(text, self.decimal_separator);
                if is_plain_number(&normalized) {
                    normalized.into_owned()
                } else {
                    self.quote(text)
                }
            }
            other => self.quote_value(other),
        }
    }

    fn quote_value(&self, data: &RowValues) -> String {
        match data.to_text() {
            Some(text) => self.quote(&text),
            None => "NULL".to_string(),
        }
    }

    fn infer(&self, data: &RowValues, infer_numeric: bool) -> ColumnType {
        if infer_numeric
            && let RowValues::Text(text) = data
        {
            let normalized = normalize_decimal(text, self.decimal_separator);
            if is_plain_number(&normalized) {
                return if normalized.contains('.') {
                    ColumnType::Float
                } else {
                    ColumnType::Integer
                };
            }
        }
        introspect_type(data)
    }
}

/// Infer a column type from the shape of a value.
#[must_use]
pub fn introspect_type(data: &RowValues) -> ColumnType {
    match data {
        RowValues::Bool(_) => ColumnType::Boolean,
        RowValues::Int(_) => ColumnType::Integer,
        RowValues::Float(_) => ColumnType::Float,
        RowValues::Timestamp(_) => ColumnType::Datetime,
        RowValues::Blob(_) => ColumnType::Binary,
        RowValues::Text(text) if text.chars().count() > STRING_INFERENCE_LIMIT => ColumnType::Text,
        RowValues::JSON(_) => introspect_type(&flatten_json(data)),
        RowValues::Text(_) | RowValues::Null => ColumnType::String,
    }
}

/// Truthiness used when a non-boolean value is written to a boolean column.
fn truthy(data: &RowValues) -> bool {
    match data {
        RowValues::Bool(b) => *b,
        RowValues::Int(i) => *i != 0,
        RowValues::Float(f) => *f != 0.0,
        RowValues::Text(text) => !(text.is_empty() || text == "0"),
        RowValues::Blob(bytes) => !bytes.is_empty(),
        RowValues::Null => false,
        RowValues::Timestamp(_) | RowValues::JSON(_) => true,
    }
}

/// Reduce a JSON value to the scalar it stands for; empty containers count as NULL.
fn flatten_json(data: &RowValues) -> Cow<'_, RowValues> {
    let RowValues::JSON(json) = data else {
        return Cow::Borrowed(data);
    };
    let flat = match json {
        JsonValue::Null => RowValues::Null,
        JsonValue::Array(items) if items.is_empty() => RowValues::Null,
        JsonValue::Object(fields) if fields.is_empty() => RowValues::Null,
        JsonValue::Bool(b) => RowValues::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RowValues::Int(i)
            } else if n.is_f64() {
                RowValues::Float(n.as_f64().unwrap_or(f64::NAN))
            } else {
                RowValues::Text(n.to_string())
            }
        }
        JsonValue::String(s) => RowValues::Text(s.clone()),
        other => RowValues::Text(other.to_string()),
    };
    Cow::Owned(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enc() -> ValueEncoder {
        ValueEncoder::default()
    }

    fn text(s: &str) -> RowValues {
        RowValues::Text(s.to_string())
    }

    #[test]
    fn booleans_use_numeric_literals() {
        assert_eq!(enc().value(&RowValues::Bool(true), None, false), "1");
        assert_eq!(enc().value(&RowValues::Bool(false), None, false), "0");
        assert_eq!(enc().value(&text("yes"), Some(ColumnType::Boolean), false), "1");
        assert_eq!(enc().value(&text("0"), Some(ColumnType::Boolean), false), "0");
        assert_eq!(enc().value(&text(""), Some(ColumnType::Boolean), false), "0");
    }

    #[test]
    fn null_and_empty_containers_are_null() {
        assert_eq!(enc().value(&RowValues::Null, None, false), "NULL");
        assert_eq!(enc().value(&RowValues::Null, Some(ColumnType::String), false), "NULL");
        assert_eq!(enc().value(&RowValues::JSON(json!([])), None, false), "NULL");
        assert_eq!(enc().value(&RowValues::JSON(json!({})), None, false), "NULL");
        assert_eq!(enc().value(&RowValues::JSON(JsonValue::Null), None, false), "NULL");
    }

    #[test]
    fn empty_string_depends_on_declared_type() {
        assert_eq!(enc().value(&text(""), Some(ColumnType::Integer), false), "NULL");
        assert_eq!(enc().value(&text(""), Some(ColumnType::Float), false), "NULL");
        assert_eq!(enc().value(&text(""), Some(ColumnType::String), false), "''");
        assert_eq!(enc().value(&text(""), None, false), "''");
    }

    #[test]
    fn numbers_pass_through_unquoted() {
        assert_eq!(enc().value(&RowValues::Int(42), None, false), "42");
        assert_eq!(enc().value(&RowValues::Int(-7), Some(ColumnType::Integer), false), "-7");
        assert_eq!(enc().value(&RowValues::Float(3.5), None, false), "3.5");
        assert_eq!(enc().value(&text("42"), Some(ColumnType::Integer), false), "42");
        assert_eq!(enc().value(&text("0"), Some(ColumnType::Integer), false), "0");
        assert_eq!(enc().value(&text("12.75"), Some(ColumnType::Float), false), "12.75");
    }

    #[test]
    fn numeric_lookalikes_are_quoted() {
        assert_eq!(enc().value(&text("0123"), Some(ColumnType::Integer), false), "'0123'");
        assert_eq!(enc().value(&text("1e3"), Some(ColumnType::Float), false), "'1e3'");
        assert_eq!(enc().value(&text("1,000"), Some(ColumnType::Integer), false), "'1,000'");
        assert_eq!(enc().value(&text("12abc"), Some(ColumnType::Integer), false), "'12abc'");
    }

    #[test]
    fn undeclared_strings_are_quoted_unless_inference_is_allowed() {
        assert_eq!(enc().value(&text("42"), None, false), "'42'");
        assert_eq!(enc().value(&text("42"), None, true), "42");
        assert_eq!(enc().value(&text("4.2"), None, true), "4.2");
        assert_eq!(enc().value(&text("0123"), None, true), "'0123'");
    }

    #[test]
    fn comma_locale_normalizes_decimal_strings() {
        let enc = ValueEncoder::new(false, ',');
        assert_eq!(enc.value(&text("3,5"), Some(ColumnType::Float), false), "3.5");
        assert_eq!(enc.value(&RowValues::Float(3.5), None, false), "3.5");
        assert_eq!(enc.value(&text("1.000,5"), Some(ColumnType::Float), false), "'1.000,5'");
    }

    #[test]
    fn strings_are_escaped_per_sql_mode() {
        assert_eq!(enc().value(&text("O'Reilly"), None, false), "'O\\'Reilly'");
        let strict = ValueEncoder::new(true, '.');
        assert_eq!(strict.value(&text("O'Reilly"), None, false), "'O''Reilly'");
        assert_eq!(enc().value(&RowValues::Int(5), Some(ColumnType::String), false), "'5'");
    }

    #[test]
    fn json_scalars_and_documents() {
        assert_eq!(enc().value(&RowValues::JSON(json!(true)), None, false), "1");
        assert_eq!(enc().value(&RowValues::JSON(json!(12)), None, false), "12");
        assert_eq!(enc().value(&RowValues::JSON(json!("hi")), None, false), "'hi'");
        assert_eq!(
            enc().value(&RowValues::JSON(json!({"a": 1})), None, false),
            "'{\\\"a\\\":1}'"
        );
    }

    #[test]
    fn introspects_closed_type_set() {
        assert_eq!(introspect_type(&RowValues::Bool(true)), ColumnType::Boolean);
        assert_eq!(introspect_type(&RowValues::Int(1)), ColumnType::Integer);
        assert_eq!(introspect_type(&RowValues::Float(1.5)), ColumnType::Float);
        assert_eq!(introspect_type(&text("short")), ColumnType::String);
        assert_eq!(introspect_type(&text(&"x".repeat(256))), ColumnType::Text);
    }

    #[test]
    fn values_encodes_each_element() {
        let out = enc().values(&[RowValues::Int(1), RowValues::Null, text("a")], None);
        assert_eq!(out, vec!["1", "NULL", "'a'"]);
    }
}
