//! Conversion of values into SQL literal text.
//!
//! - `escape`: string escaping under both backslash and `NO_BACKSLASH_ESCAPES` rules
//! - `numeric`: the numeric-literal grammar used to decide unquoted pass-through
//! - `base`: literals shared by every SQL backend (timestamps, blobs)
//! - `value`: the MySQL value encoder built on the three above

pub mod base;
pub mod escape;
pub mod numeric;
pub mod value;

pub use escape::{escape_string, quote_identifier};
pub use value::{ValueEncoder, introspect_type};
