use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::SourceCache;
use crate::encoding::{ValueEncoder, quote_identifier};
use crate::error::{DboError, NativeError};
use crate::mysql::client::{ConnectParams, MysqlClient, TlsRequest};
use crate::mysql::config::{MysqlOptions, NO_AUTO_CREATE_USER, NO_BACKSLASH_ESCAPES};
use crate::results::{ColumnMap, ResultHandle};
use crate::types::{ColumnType, RowValues, ServerVersion};

/// The result currently being read, together with the column map built for it.
pub(crate) struct AttachedResult {
    pub(crate) handle: ResultHandle,
    pub(crate) map: ColumnMap,
}

/// A MySQL datasource: one connection, at most one attached result.
///
/// The adapter is exclusively owned by a single logical session; every operation takes
/// `&mut self` and completes one request/response round trip before returning.
///
/// Failures come back as `Err` and are also remembered, so `last_error()` reports the most
/// recent native error the way the model layer expects.
pub struct MysqlDbo<C: MysqlClient> {
    pub(crate) client: C,
    pub(crate) options: MysqlOptions,
    pub(crate) connected: bool,
    pub(crate) handle_open: bool,
    pub(crate) use_alias: bool,
    pub(crate) sql_modes: Vec<String>,
    pub(crate) result: Option<AttachedResult>,
    pub(crate) last_affected: Option<u64>,
    pub(crate) last_error: Option<NativeError>,
    pub(crate) source_cache: Option<Arc<dyn SourceCache>>,
}

#[cfg(feature = "mysql")]
impl MysqlDbo<crate::mysql::native::NativeClient> {
    /// Adapter backed by the `mysql_async` client.
    #[must_use]
    pub fn new(options: MysqlOptions) -> Self {
        Self::with_client(options, crate::mysql::native::NativeClient::new())
    }
}

impl<C: MysqlClient> MysqlDbo<C> {
    #[must_use]
    pub fn with_client(options: MysqlOptions, client: C) -> Self {
        Self {
            client,
            options,
            connected: false,
            handle_open: false,
            use_alias: false,
            sql_modes: Vec::new(),
            result: None,
            last_affected: None,
            last_error: None,
            source_cache: None,
        }
    }

    /// Share a table-listing cache with this adapter.
    #[must_use]
    pub fn with_source_cache(mut self, cache: Arc<dyn SourceCache>) -> Self {
        self.source_cache = Some(cache);
        self
    }

    /// Whether this build carries the native MySQL client.
    #[must_use]
    pub fn enabled() -> bool {
        cfg!(feature = "mysql")
    }

    #[must_use]
    pub fn options(&self) -> &MysqlOptions {
        &self.options
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the server supports the table aliasing the model layer generates (4.1+).
    #[must_use]
    pub fn use_alias(&self) -> bool {
        self.use_alias
    }

    #[must_use]
    pub fn server_version(&self) -> Option<ServerVersion> {
        self.client.server_version()
    }

    /// SQL modes in effect for the current session, as reported by the server.
    #[must_use]
    pub fn sql_modes(&self) -> &[String] {
        &self.sql_modes
    }

    /// Connect using the adapter's options.
    ///
    /// On success the connection is negotiated: character set first, then SQL modes, then the
    /// session's effective modes are read back for escaping. If any step fails the adapter
    /// stays disconnected even though the socket is open, so nothing runs under an unexpected
    /// charset or dialect.
    ///
    /// # Errors
    ///
    /// Returns `DboError::NativeError` for a refused connection or a failed charset/SQL mode
    /// step. The same error is available afterwards from `last_error()`.
    pub async fn connect(&mut self) -> Result<(), DboError> {
        self.connected = false;
        self.sql_modes.clear();
        let params = self.connect_params();

        if let Some(tls) = params.tls
            && !tls.verify_server_cert
        {
            warn!(
                host = %params.host,
                "TLS requested with ssl_verify=false: the server certificate will NOT be verified"
            );
        }
        debug!(
            host = %params.host,
            port = params.port,
            database = ?params.database,
            socket = ?params.socket,
            tls = params.tls.is_some(),
            "connecting to MySQL"
        );

        let connected = self.client.real_connect(&params).await;
        self.record(connected)?;
        self.handle_open = true;
        self.connected = true;
        self.use_alias = self
            .client
            .server_version()
            .is_some_and(|version| version >= ServerVersion::ALIASES);

        if let Some(encoding) = self.options.encoding.clone().filter(|e| !e.is_empty())
            && let Err(err) = self.set_encoding(&encoding).await
        {
            warn!(encoding = %encoding, error = %err, "failed to apply character set; marking disconnected");
            self.connected = false;
            return Err(err);
        }

        let negotiated = if self.options.sql_modes.is_empty() {
            self.refresh_sql_modes().await
        } else {
            let modes = self.options.sql_modes.clone();
            self.set_sql_mode(&modes).await
        };
        if let Err(err) = negotiated {
            warn!(error = %err, "failed to apply SQL modes; marking disconnected");
            self.connected = false;
            self.sql_modes.clear();
            return Err(err);
        }

        Ok(())
    }

    /// Release the attached result and close the connection.
    ///
    /// Returns `true` when the adapter is now disconnected.
    pub async fn disconnect(&mut self) -> bool {
        if let Some(previous) = self.result.take() {
            debug!(handle = previous.handle.id(), "releasing result handle on disconnect");
        }
        let closed = self.client.close().await;
        self.connected = self.record(closed).is_err();
        if !self.connected {
            self.handle_open = false;
            self.sql_modes.clear();
        }
        !self.connected
    }

    /// Set the connection character set.
    ///
    /// # Errors
    ///
    /// Returns `DboError::NativeError` if the server rejects the character set.
    pub async fn set_encoding(&mut self, encoding: &str) -> Result<(), DboError> {
        let applied = self.client.set_charset(encoding).await;
        self.record(applied)
    }

    /// Character set of the connection, or `None` when no connection was ever opened.
    ///
    /// # Errors
    ///
    /// Returns `DboError::NativeError` if the server cannot report it.
    pub async fn get_encoding(&mut self) -> Result<Option<String>, DboError> {
        if !self.handle_open {
            return Ok(None);
        }
        let name = self.client.character_set_name().await;
        self.record(name).map(Some)
    }

    /// Apply `modes` as the session SQL mode.
    ///
    /// `NO_AUTO_CREATE_USER` is dropped on 8.0+ servers, which no longer know it. Afterwards
    /// `sql_modes()` holds what the server reports for the session.
    ///
    /// # Errors
    ///
    /// Returns `DboError` if the `SET SQL_MODE` statement fails.
    pub async fn set_sql_mode(&mut self, modes: &[String]) -> Result<(), DboError> {
        let drop_auto_create_user = self
            .client
            .server_version()
            .is_some_and(|version| version >= ServerVersion::NO_AUTO_CREATE_USER_REMOVED);

        let modes: Vec<String> = modes
            .iter()
            .map(|mode| mode.trim().to_string())
            .filter(|mode| {
                if drop_auto_create_user && mode.eq_ignore_ascii_case(NO_AUTO_CREATE_USER) {
                    warn!("dropping SQL mode {NO_AUTO_CREATE_USER}: removed in MySQL 8.0");
                    false
                } else {
                    true
                }
            })
            .collect();

        let literal = self.value(&RowValues::Text(modes.join(",")), None, false);
        self.run_statement(&format!("SET SQL_MODE = {literal}")).await?;
        debug!(modes = %modes.join(","), "applied SQL modes");
        Ok(())
    }

    /// Re-read the session's SQL modes from the server.
    pub(crate) async fn refresh_sql_modes(&mut self) -> Result<(), DboError> {
        let reported = self.client.session_sql_mode().await;
        let reported = self.record(reported)?;
        self.sql_modes = reported
            .split(',')
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
            .map(str::to_string)
            .collect();
        debug!(sql_mode = %reported, "session SQL modes");
        Ok(())
    }

    /// Encode a value as a SQL literal under this session's escaping rules.
    ///
    /// See [`ValueEncoder::value`] for the resolution order.
    #[must_use]
    pub fn value(&self, data: &RowValues, column: Option<ColumnType>, infer_numeric: bool) -> String {
        self.encoder().value(data, column, infer_numeric)
    }

    /// Quote an identifier (`table`, `table.column`).
    #[must_use]
    pub fn name(&self, identifier: &str) -> String {
        quote_identifier(identifier)
    }

    /// Canonical boolean literal.
    #[must_use]
    pub fn boolean(&self, value: bool) -> &'static str {
        ValueEncoder::boolean(value)
    }

    #[must_use]
    pub fn encoder(&self) -> ValueEncoder {
        let no_backslash_escapes = self
            .sql_modes
            .iter()
            .any(|mode| mode.eq_ignore_ascii_case(NO_BACKSLASH_ESCAPES));
        ValueEncoder::new(no_backslash_escapes, self.options.decimal_separator)
    }

    pub(crate) fn connect_params(&self) -> ConnectParams {
        let opts = &self.options;
        ConnectParams {
            host: opts.effective_host(),
            login: opts.login.clone(),
            password: opts.password.clone(),
            database: opts.database.clone(),
            port: opts.port,
            socket: opts.socket.clone(),
            tls: opts.use_ssl.then_some(TlsRequest {
                verify_server_cert: opts.ssl_verify,
            }),
        }
    }

    /// Remember the outcome of a native call as the last error and lift it into `DboError`.
    pub(crate) fn record<T>(&mut self, outcome: Result<T, NativeError>) -> Result<T, DboError> {
        match outcome {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                debug!(code = err.code, message = %err.message, "native call failed");
                self.last_error = Some(err.clone());
                Err(DboError::NativeError(err))
            }
        }
    }

    pub(crate) fn ensure_connected(&self) -> Result<(), DboError> {
        if self.connected {
            Ok(())
        } else {
            Err(DboError::NotConnected)
        }
    }
}

impl<C: MysqlClient> fmt::Debug for MysqlDbo<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlDbo")
            .field("host", &self.options.host)
            .field("database", &self.options.database)
            .field("connected", &self.connected)
            .field("use_alias", &self.use_alias)
            .field("sql_modes", &self.sql_modes)
            .field("result", &self.result.as_ref().map(|r| r.handle.id()))
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
