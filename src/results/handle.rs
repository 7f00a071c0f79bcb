use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::RowValues;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Column metadata as reported by the server for one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Table (or table alias) the column belongs to; empty for computed columns.
    pub table: String,
    /// Column name (or alias) as it appears in the result.
    pub name: String,
}

impl ColumnMeta {
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Column with no owning table, e.g. `COUNT(*)` or `LAST_INSERT_ID()`.
    #[must_use]
    pub fn computed(name: impl Into<String>) -> Self {
        Self::new("", name)
    }
}

/// Everything one statement produced on the wire: an optional result set plus the OK packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Result columns; empty when the statement produced no result set.
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<RowValues>>,
    pub affected_rows: u64,
}

impl QueryOutcome {
    /// Outcome of a statement that returned rows.
    #[must_use]
    pub fn rows(columns: Vec<ColumnMeta>, rows: Vec<Vec<RowValues>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
        }
    }

    /// Outcome of a statement without a result set (INSERT, UPDATE, SET, ...).
    #[must_use]
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_result_set(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// A fully buffered result set with a forward-only cursor.
///
/// Handles are not `Clone`: whoever owns the handle owns the rows, and dropping it releases
/// them. Each handle carries a process-unique id so callers can tell two handles apart.
#[derive(Debug)]
pub struct ResultHandle {
    id: u64,
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<RowValues>>,
    position: usize,
}

impl ResultHandle {
    #[must_use]
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<RowValues>>) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            columns,
            rows,
            position: 0,
        }
    }

    /// Build a handle from a statement outcome, or `None` if it produced no result set.
    #[must_use]
    pub fn from_outcome(outcome: QueryOutcome) -> Option<Self> {
        if outcome.has_result_set() {
            Some(Self::new(outcome.columns, outcome.rows))
        } else {
            None
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    #[must_use]
    pub fn num_fields(&self) -> usize {
        self.columns.len()
    }

    /// Total number of rows in the result, independent of the cursor.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Advance the cursor, returning the next positional row.
    pub fn fetch_row(&mut self) -> Option<&[RowValues]> {
        let row = self.rows.get(self.position)?;
        self.position += 1;
        Some(row)
    }

    /// Rewind the cursor to the first row.
    pub fn data_seek(&mut self, position: usize) {
        self.position = position.min(self.rows.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_get_distinct_ids() {
        let a = ResultHandle::new(vec![ColumnMeta::computed("x")], vec![]);
        let b = ResultHandle::new(vec![ColumnMeta::computed("x")], vec![]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn cursor_walks_rows_once() {
        let mut handle = ResultHandle::new(
            vec![ColumnMeta::new("users", "id")],
            vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]],
        );
        assert_eq!(handle.num_rows(), 2);
        assert_eq!(handle.fetch_row(), Some(&[RowValues::Int(1)][..]));
        assert_eq!(handle.fetch_row(), Some(&[RowValues::Int(2)][..]));
        assert_eq!(handle.fetch_row(), None);
        handle.data_seek(0);
        assert_eq!(handle.fetch_row(), Some(&[RowValues::Int(1)][..]));
    }

    #[test]
    fn outcome_without_columns_has_no_handle() {
        assert!(ResultHandle::from_outcome(QueryOutcome::affected(3)).is_none());
    }
}
