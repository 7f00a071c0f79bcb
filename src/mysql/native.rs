//! `MysqlClient` over `mysql_async`, using the text protocol.

use std::collections::{HashMap, VecDeque};
use std::sync::{LazyLock, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use mysql_async::prelude::Queryable;
use mysql_async::{
    Column, Conn, Opts, OptsBuilder, Pool, QueryResult, Row, SslOpts, TextProtocol, Value,
};

use super::client::{ConnectParams, MysqlClient};
use super::config::{has_persistent_prefix, strip_persistent_prefix};
use crate::error::{NativeError, client_codes};
use crate::results::{ColumnMeta, QueryOutcome};
use crate::types::{RowValues, ServerVersion};

/// Pools backing persistent (`p:`) connections, one per connection identity.
static PERSISTENT_POOLS: LazyLock<Mutex<HashMap<String, Pool>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Results of one statement in server order. A result set that failed to read ends the
/// sequence as an `Err`.
type Outcomes = VecDeque<Result<QueryOutcome, NativeError>>;

/// The real client: one `mysql_async` connection plus the results still pending from a
/// multi-result statement.
#[derive(Debug, Default)]
pub struct NativeClient {
    conn: Option<Conn>,
    persistent: bool,
    version: Option<ServerVersion>,
    pending: Outcomes,
}

impl NativeClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&mut self) -> Result<&mut Conn, NativeError> {
        self.conn.as_mut().ok_or_else(NativeError::gone_away)
    }

    async fn run(&mut self, sql: &str) -> Result<Outcomes, NativeError> {
        if !self.pending.is_empty() {
            return Err(NativeError::out_of_sync());
        }
        let conn = self.conn()?;
        collect_results(conn, sql).await
    }
}

#[async_trait]
impl MysqlClient for NativeClient {
    async fn real_connect(&mut self, params: &ConnectParams) -> Result<(), NativeError> {
        if self.conn.is_some() {
            self.close().await?;
        }

        let persistent = has_persistent_prefix(&params.host);
        let opts: Opts = build_opts(params).into();
        let conn = if persistent {
            let pool = persistent_pool(params, opts);
            pool.get_conn().await?
        } else {
            Conn::new(opts).await?
        };

        self.version = Some(ServerVersion::from(conn.server_version()));
        self.persistent = persistent;
        self.pending.clear();
        self.conn = Some(conn);
        Ok(())
    }

    fn server_version(&self) -> Option<ServerVersion> {
        self.conn.as_ref().and(self.version)
    }

    async fn query(&mut self, sql: &str) -> Result<QueryOutcome, NativeError> {
        let mut outcomes = self.run(sql).await?;
        outcomes.pop_front().unwrap_or_else(|| Ok(QueryOutcome::default()))
    }

    async fn multi_query(&mut self, sql: &str) -> Result<QueryOutcome, NativeError> {
        let mut outcomes = self.run(sql).await?;
        let first = outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(QueryOutcome::default()))?;
        self.pending = outcomes;
        Ok(first)
    }

    fn more_results(&self) -> bool {
        !self.pending.is_empty()
    }

    async fn next_result(&mut self) -> Result<Option<QueryOutcome>, NativeError> {
        self.pending.pop_front().transpose()
    }

    async fn set_charset(&mut self, charset: &str) -> Result<(), NativeError> {
        if charset.is_empty()
            || !charset
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(NativeError::new(
                client_codes::CR_CANT_READ_CHARSET,
                format!("Can't initialize character set {charset}"),
            ));
        }
        if !self.pending.is_empty() {
            return Err(NativeError::out_of_sync());
        }
        self.conn()?
            .query_drop(format!("SET NAMES {charset}"))
            .await
            .map_err(NativeError::from)
    }

    async fn character_set_name(&mut self) -> Result<String, NativeError> {
        let name: Option<String> = self
            .conn()?
            .query_first("SELECT @@character_set_client")
            .await?;
        name.ok_or_else(|| {
            NativeError::new(client_codes::CR_UNKNOWN_ERROR, "character set not reported")
        })
    }

    async fn session_sql_mode(&mut self) -> Result<String, NativeError> {
        if !self.pending.is_empty() {
            return Err(NativeError::out_of_sync());
        }
        let mode: Option<String> = self
            .conn()?
            .query_first("SELECT @@SESSION.sql_mode")
            .await?;
        Ok(mode.unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), NativeError> {
        self.pending.clear();
        self.version = None;
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if self.persistent {
            // dropping a pooled connection hands it back to its pool
            drop(conn);
            Ok(())
        } else {
            conn.disconnect().await.map_err(NativeError::from)
        }
    }
}

fn build_opts(params: &ConnectParams) -> OptsBuilder {
    let host = strip_persistent_prefix(&params.host);
    let mut builder = OptsBuilder::default()
        .user(Some(params.login.clone()))
        .pass(Some(params.password.clone()))
        .db_name(params.database.clone())
        .tcp_port(params.port);
    if !host.is_empty() {
        builder = builder.ip_or_hostname(host);
    }
    if let Some(socket) = &params.socket {
        builder = builder.socket(Some(socket.clone()));
    }
    if let Some(tls) = params.tls {
        let mut ssl = SslOpts::default();
        if !tls.verify_server_cert {
            ssl = ssl.with_danger_accept_invalid_certs(true);
        }
        builder = builder.ssl_opts(Some(ssl));
    }
    builder
}

fn persistent_pool(params: &ConnectParams, opts: Opts) -> Pool {
    let key = format!(
        "{}:{}@{}:{}/{}?socket={}&tls={:?}",
        params.login,
        params.password,
        strip_persistent_prefix(&params.host),
        params.port,
        params.database.as_deref().unwrap_or_default(),
        params.socket.as_deref().unwrap_or_default(),
        params.tls,
    );
    let mut pools = match PERSISTENT_POOLS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    pools.entry(key).or_insert_with(|| Pool::new(opts)).clone()
}

/// Read every result a statement produced, in server order.
///
/// A failure on the first result set fails the statement. A failure on a later set keeps
/// the sets already read and ends the sequence with the error, so the caller still gets the
/// first result and sees the error when it drains.
async fn collect_results(conn: &mut Conn, sql: &str) -> Result<Outcomes, NativeError> {
    let mut result = conn.query_iter(sql).await?;
    let mut outcomes = VecDeque::new();
    loop {
        match read_result_set(&mut result).await {
            Ok(outcome) => outcomes.push_back(Ok(outcome)),
            Err(err) if outcomes.is_empty() => return Err(err.into()),
            Err(err) => {
                outcomes.push_back(Err(err.into()));
                break;
            }
        }
        if result.is_empty() {
            break;
        }
    }
    Ok(outcomes)
}

async fn read_result_set(
    result: &mut QueryResult<'_, '_, TextProtocol>,
) -> Result<QueryOutcome, mysql_async::Error> {
    let columns: Vec<ColumnMeta> = result
        .columns()
        .map(|columns| columns.iter().map(column_meta).collect())
        .unwrap_or_default();
    let rows: Vec<Row> = result.collect().await?;
    let width = columns.len();
    Ok(QueryOutcome {
        columns,
        rows: rows.iter().map(|row| decode_row(row, width)).collect(),
        affected_rows: result.affected_rows(),
    })
}

fn column_meta(column: &Column) -> ColumnMeta {
    ColumnMeta::new(column.table_str(), column.name_str())
}

fn decode_row(row: &Row, width: usize) -> Vec<RowValues> {
    (0..width.max(row.len()))
        .map(|idx| row.as_ref(idx).map_or(RowValues::Null, decode_value))
        .collect()
}

fn decode_value(value: &Value) -> RowValues {
    match value {
        Value::NULL => RowValues::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(text) => RowValues::Text(text),
            Err(err) => RowValues::Blob(err.into_bytes()),
        },
        Value::Int(i) => RowValues::Int(*i),
        Value::UInt(u) => i64::try_from(*u).map_or_else(|_| RowValues::Text(u.to_string()), RowValues::Int),
        Value::Float(f) => RowValues::Float(f64::from(*f)),
        Value::Double(d) => RowValues::Float(*d),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            NaiveDate::from_ymd_opt(i32::from(*year), u32::from(*month), u32::from(*day))
                .and_then(|date| {
                    date.and_hms_micro_opt(
                        u32::from(*hour),
                        u32::from(*minute),
                        u32::from(*second),
                        *micros,
                    )
                })
                .map_or_else(
                    || {
                        RowValues::Text(format!(
                            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                        ))
                    },
                    RowValues::Timestamp,
                )
        }
        Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            let sign = if *negative { "-" } else { "" };
            RowValues::Text(format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}"))
        }
    }
}
