// MySQL module - the adapter and the native client it drives
//
// - config: connection options and the persistent-host convention
// - client: the native client seam (`MysqlClient`)
// - native: `MysqlClient` over mysql_async (feature `mysql`)
// - connection: the adapter itself, split into connect/execute/cursor/metadata

pub mod client;
pub mod config;
pub mod connection;
#[cfg(feature = "mysql")]
pub mod native;

// Re-export the public API
pub use client::{ConnectParams, MysqlClient, TlsRequest};
pub use config::{DEFAULT_SQL_MODES, MysqlOptions, MysqlOptionsBuilder};
pub use connection::{MysqlDbo, is_procedure_call};
#[cfg(feature = "mysql")]
pub use native::NativeClient;

/// The adapter over the real `mysql_async` client.
#[cfg(feature = "mysql")]
pub type DboMysql = MysqlDbo<NativeClient>;
