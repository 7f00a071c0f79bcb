use serde::Deserialize;

use crate::error::DboError;

/// Host prefix that asks the client for a reusable (persistent) connection.
pub const PERSISTENT_HOST_PREFIX: &str = "p:";

/// Mode removed in MySQL 8.0; sending it there is an error.
pub const NO_AUTO_CREATE_USER: &str = "NO_AUTO_CREATE_USER";

/// Mode under which backslashes are literal inside strings.
pub const NO_BACKSLASH_ESCAPES: &str = "NO_BACKSLASH_ESCAPES";

/// SQL modes enforced on every connection unless configured otherwise.
pub const DEFAULT_SQL_MODES: [&str; 5] = [
    "NO_ZERO_IN_DATE",
    "NO_ZERO_DATE",
    "ERROR_FOR_DIVISION_BY_ZERO",
    "NO_ENGINE_SUBSTITUTION",
    NO_AUTO_CREATE_USER,
];

/// Options for a MySQL datasource.
///
/// Every field has a default, so partial configs deserialize cleanly:
/// ```rust
/// use dbo_mysql::prelude::*;
///
/// let opts: MysqlOptions = serde_json::from_str(r#"{"database": "blog", "port": 3307}"#).unwrap();
/// assert_eq!(opts.host, "localhost");
/// assert_eq!(opts.port, 3307);
/// assert!(opts.persistent);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MysqlOptions {
    pub persistent: bool,
    pub host: String,
    pub login: String,
    pub password: String,
    pub database: Option<String>,
    pub port: u16,
    pub socket: Option<String>,
    pub use_ssl: bool,
    /// Verify the server certificate when `use_ssl` is set.
    ///
    /// Turning this off accepts any certificate, including a forged one. It is honored only
    /// when set explicitly, and every connect made that way logs a warning.
    pub ssl_verify: bool,
    pub sql_modes: Vec<String>,
    pub encoding: Option<String>,
    /// Marker in a column name that flags a computed `Model__field` virtual field.
    pub virtual_field_separator: String,
    /// Decimal separator of the host locale used when reading numeric strings.
    pub decimal_separator: char,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            persistent: true,
            host: "localhost".to_string(),
            login: "root".to_string(),
            password: String::new(),
            database: None,
            port: 3306,
            socket: None,
            use_ssl: false,
            ssl_verify: true,
            sql_modes: DEFAULT_SQL_MODES.iter().map(ToString::to_string).collect(),
            encoding: None,
            virtual_field_separator: "__".to_string(),
            decimal_separator: '.',
        }
    }
}

impl MysqlOptions {
    #[must_use]
    pub fn new(host: impl Into<String>, database: Option<String>) -> Self {
        Self {
            host: host.into(),
            database,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder() -> MysqlOptionsBuilder {
        MysqlOptionsBuilder::new()
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `DboError::ConfigError` if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, DboError> {
        serde_json::from_str(json).map_err(|e| DboError::ConfigError(format!("{e}")))
    }

    /// Host string handed to the client, with the persistent marker applied.
    ///
    /// An empty host (unix socket connections) is never prefixed, and a host that already
    /// carries the marker is left alone.
    #[must_use]
    pub fn effective_host(&self) -> String {
        if self.persistent && !self.host.is_empty() && !has_persistent_prefix(&self.host) {
            format!("{PERSISTENT_HOST_PREFIX}{}", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Key identifying the database these options point at.
    #[must_use]
    pub fn identity(&self) -> String {
        let host = strip_persistent_prefix(&self.host);
        let target = match &self.socket {
            Some(socket) if host.is_empty() => socket.clone(),
            _ => format!("{host}:{}", self.port),
        };
        format!(
            "{}@{}/{}",
            self.login,
            target,
            self.database.as_deref().unwrap_or_default()
        )
    }
}

#[must_use]
pub fn has_persistent_prefix(host: &str) -> bool {
    host.get(..PERSISTENT_HOST_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PERSISTENT_HOST_PREFIX))
}

#[must_use]
pub fn strip_persistent_prefix(host: &str) -> &str {
    if has_persistent_prefix(host) {
        &host[PERSISTENT_HOST_PREFIX.len()..]
    } else {
        host
    }
}

/// Fluent builder for MySQL options.
#[derive(Debug, Clone, Default)]
pub struct MysqlOptionsBuilder {
    opts: MysqlOptions,
}

impl MysqlOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.opts.persistent = persistent;
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = host.into();
        self
    }

    #[must_use]
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.opts.login = login.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = password.into();
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.opts.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn socket(mut self, socket: Option<String>) -> Self {
        self.opts.socket = socket;
        self
    }

    #[must_use]
    pub fn ssl(mut self, use_ssl: bool, ssl_verify: bool) -> Self {
        self.opts.use_ssl = use_ssl;
        self.opts.ssl_verify = ssl_verify;
        self
    }

    #[must_use]
    pub fn sql_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.sql_modes = modes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.opts.encoding = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn virtual_field_separator(mut self, separator: impl Into<String>) -> Self {
        self.opts.virtual_field_separator = separator.into();
        self
    }

    #[must_use]
    pub fn decimal_separator(mut self, separator: char) -> Self {
        self.opts.decimal_separator = separator;
        self
    }

    #[must_use]
    pub fn finish(self) -> MysqlOptions {
        self.opts
    }
}
