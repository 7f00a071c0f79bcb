use std::fmt;

use async_trait::async_trait;

use crate::error::NativeError;
use crate::results::QueryOutcome;
use crate::types::ServerVersion;

/// TLS request passed to the client at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsRequest {
    /// When false the server certificate is accepted without verification.
    pub verify_server_cert: bool,
}

/// Everything the client needs to open a connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Host, possibly carrying the persistent-connection prefix.
    pub host: String,
    pub login: String,
    pub password: String,
    pub database: Option<String>,
    pub port: u16,
    pub socket: Option<String>,
    pub tls: Option<TlsRequest>,
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("login", &self.login)
            .field("database", &self.database)
            .field("port", &self.port)
            .field("socket", &self.socket)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

/// The native client surface the adapter drives.
///
/// Calls are strictly sequential on one connection. `multi_query` leaves any result sets
/// after the first pending until they are drained through `next_result`; issuing `query`
/// while sets are pending fails with a commands-out-of-sync error.
#[async_trait]
pub trait MysqlClient: Send {
    /// Open the network connection.
    async fn real_connect(&mut self, params: &ConnectParams) -> Result<(), NativeError>;

    /// Version reported by the server handshake, once connected.
    fn server_version(&self) -> Option<ServerVersion>;

    /// Run a statement expecting a single result.
    async fn query(&mut self, sql: &str) -> Result<QueryOutcome, NativeError>;

    /// Run a statement that may yield several results, returning the first.
    async fn multi_query(&mut self, sql: &str) -> Result<QueryOutcome, NativeError>;

    /// Whether results from the last `multi_query` are still pending.
    fn more_results(&self) -> bool;

    /// Take the next pending result, or `None` when none are left.
    async fn next_result(&mut self) -> Result<Option<QueryOutcome>, NativeError>;

    async fn set_charset(&mut self, charset: &str) -> Result<(), NativeError>;

    async fn character_set_name(&mut self) -> Result<String, NativeError>;

    /// Comma-separated `sql_mode` of the current session.
    async fn session_sql_mode(&mut self) -> Result<String, NativeError>;

    async fn close(&mut self) -> Result<(), NativeError>;
}
