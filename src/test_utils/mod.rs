//! Test doubles for driving `MysqlDbo` without a server.

mod mock;

pub use mock::MockClient;

use crate::mysql::{MysqlDbo, MysqlOptions};
use crate::results::{ColumnMeta, QueryOutcome};
use crate::types::RowValues;

/// A result set whose columns all belong to `table`.
#[must_use]
pub fn table_rows(table: &str, columns: &[&str], rows: Vec<Vec<RowValues>>) -> QueryOutcome {
    QueryOutcome::rows(
        columns
            .iter()
            .map(|column| ColumnMeta::new(table, *column))
            .collect(),
        rows,
    )
}

/// A single-row, single-column result with no owning table, e.g. `SELECT LAST_INSERT_ID()`.
#[must_use]
pub fn scalar(column: &str, value: RowValues) -> QueryOutcome {
    QueryOutcome::rows(vec![ColumnMeta::computed(column)], vec![vec![value]])
}

/// An adapter over a clone of `client`, already connected.
///
/// # Panics
/// Panics if connecting fails; the mock only fails when scripted to.
pub async fn connected(options: MysqlOptions, client: &MockClient) -> MysqlDbo<MockClient> {
    let mut dbo = MysqlDbo::with_client(options, client.clone());
    dbo.connect().await.expect("mock connect");
    dbo
}
