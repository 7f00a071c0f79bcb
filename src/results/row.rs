use indexmap::IndexMap;

use super::column_map::TableKey;
use crate::types::RowValues;

/// One fetched row, keyed by owning table and then by column name.
///
/// Both levels keep the result's column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRow {
    tables: IndexMap<TableKey, IndexMap<String, RowValues>>,
}

impl DecodedRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a value at `row[table][column]`, replacing any earlier value there.
    pub fn insert(&mut self, table: TableKey, column: impl Into<String>, value: RowValues) {
        self.tables
            .entry(table)
            .or_default()
            .insert(column.into(), value);
    }

    /// Value of `table.column`.
    #[must_use]
    pub fn get(&self, table: &str, column: &str) -> Option<&RowValues> {
        self.tables
            .get(&TableKey::named(table))
            .and_then(|columns| columns.get(column))
    }

    /// Value of a computed column.
    #[must_use]
    pub fn computed(&self, column: &str) -> Option<&RowValues> {
        self.tables
            .get(&TableKey::Computed)
            .and_then(|columns| columns.get(column))
    }

    /// All columns under one table key.
    #[must_use]
    pub fn table(&self, table: &TableKey) -> Option<&IndexMap<String, RowValues>> {
        self.tables.get(table)
    }

    /// Table keys in first-seen column order.
    pub fn tables(&self) -> impl Iterator<Item = &TableKey> {
        self.tables.keys()
    }

    /// Every `(table, column, value)` triple in table-then-column order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &str, &RowValues)> {
        self.tables.iter().flat_map(|(table, columns)| {
            columns
                .iter()
                .map(move |(column, value)| (table, column.as_str(), value))
        })
    }

    /// The first value of the row, whatever table it sits under.
    #[must_use]
    pub fn first_value(&self) -> Option<&RowValues> {
        self.tables.values().next()?.values().next()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
