//! MySQL datasource for an object-relational mapping layer.
//!
//! `MysqlDbo` opens the connection, runs SQL text, decodes rows into table-qualified maps,
//! and encodes values as SQL literals. The native client sits behind [`mysql::MysqlClient`];
//! the default `mysql` feature provides one over `mysql_async`.

pub mod cache;
pub mod encoding;
pub mod error;
pub mod mysql;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{DboError, NativeError};
pub use mysql::{MysqlDbo, MysqlOptions};
#[cfg(feature = "mysql")]
pub use mysql::DboMysql;
