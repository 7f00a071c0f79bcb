//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::cache::{MemorySourceCache, SourceCache};
pub use crate::encoding::{ValueEncoder, escape_string, introspect_type, quote_identifier};
pub use crate::error::{DboError, NativeError};
pub use crate::mysql::{
    ConnectParams, MysqlClient, MysqlDbo, MysqlOptions, MysqlOptionsBuilder, TlsRequest,
    is_procedure_call,
};
pub use crate::results::{ColumnMeta, DecodedRow, QueryOutcome, ResultHandle, TableKey};
pub use crate::types::{ColumnType, RowValues, ServerVersion};

#[cfg(feature = "mysql")]
pub use crate::mysql::{DboMysql, NativeClient};
