use std::collections::VecDeque;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use async_trait::async_trait;
use regex::Regex;

use crate::error::NativeError;
use crate::mysql::client::{ConnectParams, MysqlClient};
use crate::results::QueryOutcome;
use crate::types::ServerVersion;

static SET_SQL_MODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*set\s+(?:session\s+|@@session\.)?sql_mode\s*=\s*'([^']*)'")
        .expect("valid SET sql_mode pattern")
});

type Outcomes = VecDeque<Result<QueryOutcome, NativeError>>;

#[derive(Debug)]
struct MockState {
    version: ServerVersion,
    connect_error: Option<NativeError>,
    open: bool,
    responses: Vec<(String, Outcomes)>,
    failures: Vec<(String, NativeError)>,
    pending: Outcomes,
    statements: Vec<String>,
    connects: Vec<ConnectParams>,
    charset: String,
    charset_error: Option<NativeError>,
    default_sql_mode: String,
    sql_mode: String,
    sql_mode_error: Option<NativeError>,
    closes: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            version: ServerVersion::new(8, 0, 36),
            connect_error: None,
            open: false,
            responses: Vec::new(),
            failures: Vec::new(),
            pending: VecDeque::new(),
            statements: Vec::new(),
            connects: Vec::new(),
            charset: "utf8mb4".to_string(),
            charset_error: None,
            default_sql_mode: String::new(),
            sql_mode: String::new(),
            sql_mode_error: None,
            closes: 0,
        }
    }
}

/// Scripted in-memory `MysqlClient`.
///
/// Clones share state, so a test can hand one clone to the adapter and keep another to
/// script responses and inspect what was sent. Responses match on a case-insensitive
/// statement prefix; the first registered match wins. Statements without a scripted
/// response succeed with no result set and zero affected rows.
///
/// Like the C client, any result sets beyond the first stay pending after `query` or
/// `multi_query`, and the next statement fails with 2014 until they are drained.
///
/// The session `sql_mode` starts at the server default on every connect and follows
/// successful `SET [SESSION] sql_mode = '...'` statements.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Version reported after connecting (8.0.36 unless set).
    #[must_use]
    pub fn with_version(self, major: u16, minor: u16, patch: u16) -> Self {
        self.state().version = ServerVersion::new(major, minor, patch);
        self
    }

    /// Make every connection attempt fail with `err`.
    #[must_use]
    pub fn refuse_connect(self, err: NativeError) -> Self {
        self.state().connect_error = Some(err);
        self
    }

    /// Make `set_charset` fail with `err`.
    #[must_use]
    pub fn fail_charset(self, err: NativeError) -> Self {
        self.state().charset_error = Some(err);
        self
    }

    /// `sql_mode` a fresh session starts with (empty unless set).
    #[must_use]
    pub fn with_sql_mode(self, modes: &str) -> Self {
        self.state().default_sql_mode = modes.to_string();
        self
    }

    /// Make reading the session `sql_mode` fail with `err`.
    #[must_use]
    pub fn fail_sql_mode(self, err: NativeError) -> Self {
        self.state().sql_mode_error = Some(err);
        self
    }

    /// Answer statements starting with `prefix` with `outcome`.
    pub fn respond(&self, prefix: &str, outcome: QueryOutcome) {
        self.respond_multi(prefix, vec![outcome]);
    }

    /// Answer statements starting with `prefix` with several result sets, in order.
    pub fn respond_multi(&self, prefix: &str, outcomes: Vec<QueryOutcome>) {
        let outcomes = outcomes.into_iter().map(Ok).collect();
        self.state().responses.push((prefix.to_string(), outcomes));
    }

    /// Answer statements starting with `prefix` with `first`, then fail reading the next
    /// result set with `err`.
    pub fn respond_then_fail(&self, prefix: &str, first: QueryOutcome, err: NativeError) {
        let outcomes = VecDeque::from([Ok(first), Err(err)]);
        self.state().responses.push((prefix.to_string(), outcomes));
    }

    /// Fail statements starting with `prefix` with `err`.
    pub fn fail(&self, prefix: &str, err: NativeError) {
        self.state().failures.push((prefix.to_string(), err));
    }

    /// Every statement sent, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    /// Parameters of every connection attempt, in order.
    #[must_use]
    pub fn connects(&self) -> Vec<ConnectParams> {
        self.state().connects.clone()
    }

    #[must_use]
    pub fn charset(&self) -> String {
        self.state().charset.clone()
    }

    #[must_use]
    pub fn closes(&self) -> usize {
        self.state().closes
    }

    /// Session `sql_mode` as the server currently has it.
    #[must_use]
    pub fn sql_mode(&self) -> String {
        self.state().sql_mode.clone()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn run(&self, sql: &str) -> Result<QueryOutcome, NativeError> {
        let mut state = self.state();
        if !state.open {
            return Err(NativeError::gone_away());
        }
        if !state.pending.is_empty() {
            return Err(NativeError::out_of_sync());
        }
        state.statements.push(sql.to_string());

        if let Some((_, err)) = state
            .failures
            .iter()
            .find(|(prefix, _)| starts_with_ignore_case(sql, prefix))
        {
            return Err(err.clone());
        }

        if let Some(captures) = SET_SQL_MODE.captures(sql) {
            state.sql_mode = captures[1].to_string();
        }

        let mut outcomes = state
            .responses
            .iter()
            .find(|(prefix, _)| starts_with_ignore_case(sql, prefix))
            .map(|(_, outcomes)| outcomes.clone())
            .unwrap_or_default();
        let first = outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(QueryOutcome::default()))?;
        state.pending = outcomes;
        Ok(first)
    }
}

fn starts_with_ignore_case(sql: &str, prefix: &str) -> bool {
    let sql = sql.trim_start();
    sql.len() >= prefix.len()
        && sql.is_char_boundary(prefix.len())
        && sql[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[async_trait]
impl MysqlClient for MockClient {
    async fn real_connect(&mut self, params: &ConnectParams) -> Result<(), NativeError> {
        let mut state = self.state();
        state.connects.push(params.clone());
        if let Some(err) = state.connect_error.clone() {
            state.open = false;
            return Err(err);
        }
        state.open = true;
        state.pending.clear();
        state.sql_mode = state.default_sql_mode.clone();
        Ok(())
    }

    fn server_version(&self) -> Option<ServerVersion> {
        let state = self.state();
        state.open.then_some(state.version)
    }

    async fn query(&mut self, sql: &str) -> Result<QueryOutcome, NativeError> {
        self.run(sql)
    }

    async fn multi_query(&mut self, sql: &str) -> Result<QueryOutcome, NativeError> {
        self.run(sql)
    }

    fn more_results(&self) -> bool {
        !self.state().pending.is_empty()
    }

    async fn next_result(&mut self) -> Result<Option<QueryOutcome>, NativeError> {
        self.state().pending.pop_front().transpose()
    }

    async fn set_charset(&mut self, charset: &str) -> Result<(), NativeError> {
        let mut state = self.state();
        if !state.open {
            return Err(NativeError::gone_away());
        }
        if let Some(err) = state.charset_error.clone() {
            return Err(err);
        }
        state.charset = charset.to_string();
        Ok(())
    }

    async fn character_set_name(&mut self) -> Result<String, NativeError> {
        let state = self.state();
        if state.open {
            Ok(state.charset.clone())
        } else {
            Err(NativeError::gone_away())
        }
    }

    async fn session_sql_mode(&mut self) -> Result<String, NativeError> {
        let state = self.state();
        if !state.open {
            return Err(NativeError::gone_away());
        }
        if !state.pending.is_empty() {
            return Err(NativeError::out_of_sync());
        }
        match &state.sql_mode_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.sql_mode.clone()),
        }
    }

    async fn close(&mut self) -> Result<(), NativeError> {
        let mut state = self.state();
        state.open = false;
        state.pending.clear();
        state.closes += 1;
        Ok(())
    }
}
