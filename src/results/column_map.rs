use std::fmt;

use super::handle::ColumnMeta;

/// First-level key of a decoded row: the owning table, or the computed-column sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKey {
    /// Column sourced from a real table (or table alias).
    Named(String),
    /// Computed or virtual column with no owning table.
    Computed,
}

impl TableKey {
    #[must_use]
    pub fn named(table: impl Into<String>) -> Self {
        TableKey::Named(table.into())
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&str> {
        match self {
            TableKey::Named(table) => Some(table),
            TableKey::Computed => None,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Named(table) => f.write_str(table),
            TableKey::Computed => f.write_str("0"),
        }
    }
}

/// Positional lookup from result column index to `(table, column)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: Vec<(TableKey, String)>,
}

impl ColumnMap {
    /// Build the map for a result's columns.
    ///
    /// A column lands under `TableKey::Computed` when the server reports no owning table or
    /// when its name contains `virtual_field_separator` (a `Model__field` virtual field).
    #[must_use]
    pub fn build(columns: &[ColumnMeta], virtual_field_separator: &str) -> Self {
        let entries = columns
            .iter()
            .map(|column| {
                let is_virtual = !virtual_field_separator.is_empty()
                    && column.name.contains(virtual_field_separator);
                let key = if column.table.is_empty() || is_virtual {
                    TableKey::Computed
                } else {
                    TableKey::named(column.table.as_str())
                };
                (key, column.name.clone())
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<(&TableKey, &str)> {
        self.entries
            .get(index)
            .map(|(table, column)| (table, column.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &str)> {
        self.entries
            .iter()
            .map(|(table, column)| (table, column.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_and_virtual_columns_use_sentinel() {
        let columns = vec![
            ColumnMeta::new("posts", "id"),
            ColumnMeta::computed("count"),
            ColumnMeta::new("posts", "Post__title_length"),
            ColumnMeta::new("User", "name"),
        ];
        let map = ColumnMap::build(&columns, "__");

        assert_eq!(map.len(), 4);
        assert_eq!(map.get(0), Some((&TableKey::named("posts"), "id")));
        assert_eq!(map.get(1), Some((&TableKey::Computed, "count")));
        assert_eq!(
            map.get(2),
            Some((&TableKey::Computed, "Post__title_length"))
        );
        assert_eq!(map.get(3), Some((&TableKey::named("User"), "name")));
        assert_eq!(map.get(4), None);
    }

    #[test]
    fn empty_separator_never_marks_virtual() {
        let columns = vec![ColumnMeta::new("posts", "a__b")];
        let map = ColumnMap::build(&columns, "");
        assert_eq!(map.get(0), Some((&TableKey::named("posts"), "a__b")));
    }
}
