use thiserror::Error;

/// Client-side error codes, matching the values the MySQL client library reports.
pub mod client_codes {
    /// Unknown client error.
    pub const CR_UNKNOWN_ERROR: u16 = 2000;
    /// Can't connect to the server.
    pub const CR_CONN_HOST_ERROR: u16 = 2003;
    /// The server went away (or no connection is open).
    pub const CR_SERVER_GONE_ERROR: u16 = 2006;
    /// Commands issued while earlier result sets are still pending.
    pub const CR_COMMANDS_OUT_OF_SYNC: u16 = 2014;
    /// Unknown or unusable character set.
    pub const CR_CANT_READ_CHARSET: u16 = 2019;
}

/// An error reported by the native client or the server, as an error number plus message.
///
/// Displays as `"code: message"`, the same shape `last_error()` returns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct NativeError {
    pub code: u16,
    pub message: String,
}

impl NativeError {
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Error for operations attempted without an open connection.
    #[must_use]
    pub fn gone_away() -> Self {
        Self::new(client_codes::CR_SERVER_GONE_ERROR, "MySQL server has gone away")
    }

    #[must_use]
    pub fn out_of_sync() -> Self {
        Self::new(
            client_codes::CR_COMMANDS_OUT_OF_SYNC,
            "Commands out of sync; you can't run this command now",
        )
    }
}

#[cfg(feature = "mysql")]
impl From<mysql_async::Error> for NativeError {
    fn from(err: mysql_async::Error) -> Self {
        match err {
            mysql_async::Error::Server(ref server) => {
                NativeError::new(server.code, server.message.clone())
            }
            mysql_async::Error::Io(ref io) => {
                NativeError::new(client_codes::CR_CONN_HOST_ERROR, io.to_string())
            }
            other => NativeError::new(client_codes::CR_UNKNOWN_ERROR, other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DboError {
    #[error(transparent)]
    NativeError(#[from] NativeError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Not connected to a MySQL server")]
    NotConnected,
}

impl DboError {
    /// The native error behind this error, if any.
    #[must_use]
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            DboError::NativeError(err) => Some(err),
            _ => None,
        }
    }
}
