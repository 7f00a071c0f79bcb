use tracing::{debug, trace};

use super::core::{AttachedResult, MysqlDbo};
use crate::error::DboError;
use crate::mysql::client::MysqlClient;
use crate::results::{ColumnMap, DecodedRow, ResultHandle};
use crate::types::RowValues;

impl<C: MysqlClient> MysqlDbo<C> {
    /// Make `handle` the current result, releasing the one held before it.
    ///
    /// The held result's column map is rebuilt here and only here, so it always describes it.
    pub fn attach_result(&mut self, handle: ResultHandle) {
        if let Some(previous) = self.result.take() {
            debug!(
                previous = previous.handle.id(),
                next = handle.id(),
                "releasing previous result handle"
            );
        }
        let map = ColumnMap::build(handle.columns(), &self.options.virtual_field_separator);
        self.result = Some(AttachedResult { handle, map });
    }

    /// Advance the held result one row and decode it as `row[table][column]`.
    ///
    /// Returns `None` when no result is held or the cursor is exhausted.
    pub fn fetch_result(&mut self) -> Option<DecodedRow> {
        let AttachedResult { handle, map } = self.result.as_mut()?;
        let id = handle.id();
        let values = handle.fetch_row()?;
        trace!(handle = id, columns = values.len(), "fetched row");
        Some(decode_row(map, values))
    }

    /// Whether a result handle is currently held.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Release the held result, if any.
    pub fn free_result(&mut self) {
        if let Some(previous) = self.result.take() {
            debug!(handle = previous.handle.id(), "freed result handle");
        }
    }

    /// Rows in the held result; `None` when no result is held.
    #[must_use]
    pub fn last_num_rows(&self) -> Option<usize> {
        self.result.as_ref().map(|attached| attached.handle.num_rows())
    }

    /// Rows touched by the most recent statement; `None` until one has succeeded.
    #[must_use]
    pub fn last_affected(&self) -> Option<u64> {
        self.last_affected
    }

    /// Execute `sql`, attach its result, and decode every row.
    ///
    /// A statement without a result set yields an empty list.
    ///
    /// # Errors
    /// Returns `DboError` if executing the statement fails.
    pub async fn fetch_all(&mut self, sql: &str) -> Result<Vec<DecodedRow>, DboError> {
        let Some(handle) = self.execute(sql).await? else {
            return Ok(Vec::new());
        };
        self.attach_result(handle);
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_result() {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute `sql`, attach its result, and decode the first row only.
    ///
    /// # Errors
    /// Returns `DboError` if executing the statement fails.
    pub async fn fetch_row(&mut self, sql: &str) -> Result<Option<DecodedRow>, DboError> {
        let Some(handle) = self.execute(sql).await? else {
            return Ok(None);
        };
        self.attach_result(handle);
        Ok(self.fetch_result())
    }

    /// First decoded row of an internal lookup. Neither the held result nor the caller's
    /// counters are touched.
    pub(crate) async fn lookup_row(&mut self, sql: &str) -> Result<Option<DecodedRow>, DboError> {
        let Some(mut handle) = ResultHandle::from_outcome(self.run_statement(sql).await?) else {
            return Ok(None);
        };
        let map = ColumnMap::build(handle.columns(), &self.options.virtual_field_separator);
        Ok(handle.fetch_row().map(|values| decode_row(&map, values)))
    }
}

fn decode_row(map: &ColumnMap, values: &[RowValues]) -> DecodedRow {
    let mut row = DecodedRow::new();
    for (index, value) in values.iter().enumerate() {
        if let Some((table, column)) = map.get(index) {
            row.insert(table.clone(), column, value.clone());
        }
    }
    row
}
