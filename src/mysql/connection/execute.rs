use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::core::MysqlDbo;
use crate::error::DboError;
use crate::mysql::client::MysqlClient;
use crate::results::{QueryOutcome, ResultHandle};

static PROCEDURE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*call\b").expect("valid procedure-call pattern"));

static SQL_MODE_CHANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*set\b.*\bsql_mode\b").expect("valid sql_mode pattern")
});

/// Whether `sql` invokes a stored procedure (`CALL ...`, any case, leading whitespace allowed).
#[must_use]
pub fn is_procedure_call(sql: &str) -> bool {
    PROCEDURE_CALL.is_match(sql)
}

impl<C: MysqlClient> MysqlDbo<C> {
    /// Run one statement.
    ///
    /// Returns `Ok(Some(handle))` when the statement produced a result set and `Ok(None)` when
    /// it succeeded without one. Stored-procedure calls return their first result set; any
    /// trailing sets are drained so they cannot disturb the next statement.
    ///
    /// # Errors
    /// Returns `DboError::NotConnected` before a successful `connect`,
    /// `DboError::ExecutionError` for blank SQL, or `DboError::NativeError` when the server
    /// rejects the statement.
    pub async fn execute(&mut self, sql: &str) -> Result<Option<ResultHandle>, DboError> {
        match self.run_statement(sql).await {
            Ok(outcome) => {
                self.last_affected = Some(affected_count(&outcome));
                Ok(ResultHandle::from_outcome(outcome))
            }
            Err(err) => {
                self.last_affected = None;
                Err(err)
            }
        }
    }

    /// Send a statement without touching the caller-visible counters.
    ///
    /// Statements that change `sql_mode` re-read the session modes afterwards so escaping
    /// always follows what the server has in effect.
    pub(crate) async fn run_statement(&mut self, sql: &str) -> Result<QueryOutcome, DboError> {
        self.ensure_connected()?;
        if sql.trim().is_empty() {
            return Err(DboError::ExecutionError("empty statement".into()));
        }

        let outcome = if is_procedure_call(sql) {
            debug!(sql, "executing stored procedure call");
            self.execute_procedure(sql).await?
        } else {
            debug!(sql, "executing statement");
            let queried = self.client.query(sql).await;
            self.record(queried)?
        };

        if SQL_MODE_CHANGE.is_match(sql) {
            self.refresh_sql_modes().await?;
        }
        Ok(outcome)
    }

    async fn execute_procedure(&mut self, sql: &str) -> Result<QueryOutcome, DboError> {
        let first = self.client.multi_query(sql).await;
        let first = self.record(first)?;

        let mut drained = 0usize;
        while self.client.more_results() {
            match self.client.next_result().await {
                Ok(Some(_)) => drained += 1,
                Ok(None) => break,
                Err(err) => {
                    warn!(code = err.code, message = %err.message, "failed to drain procedure result set");
                    self.last_error = Some(err);
                    break;
                }
            }
        }
        if drained > 0 {
            debug!(drained, "discarded trailing procedure result sets");
        }
        Ok(first)
    }
}

/// Rows returned for a result set, rows changed otherwise.
fn affected_count(outcome: &QueryOutcome) -> u64 {
    if outcome.has_result_set() {
        u64::try_from(outcome.rows.len()).unwrap_or(u64::MAX)
    } else {
        outcome.affected_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_procedure_calls() {
        assert!(is_procedure_call("CALL refresh_totals()"));
        assert!(is_procedure_call("  \n\tcall refresh_totals(1)"));
        assert!(is_procedure_call("Call x"));
        assert!(!is_procedure_call("SELECT 'CALL x'"));
        assert!(!is_procedure_call("callback_log"));
        assert!(!is_procedure_call("UPDATE calls SET n = 1"));
    }

    #[test]
    fn detects_sql_mode_changes() {
        assert!(SQL_MODE_CHANGE.is_match("SET SQL_MODE = 'ANSI'"));
        assert!(SQL_MODE_CHANGE.is_match("set session sql_mode = ''"));
        assert!(SQL_MODE_CHANGE.is_match("SET @@SESSION.sql_mode = 'NO_BACKSLASH_ESCAPES'"));
        assert!(!SQL_MODE_CHANGE.is_match("SELECT @@sql_mode"));
        assert!(!SQL_MODE_CHANGE.is_match("SET NAMES utf8mb4"));
    }
}
