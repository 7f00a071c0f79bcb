use tracing::{debug, warn};

use super::core::MysqlDbo;
use crate::error::NativeError;
use crate::mysql::client::MysqlClient;
use crate::results::ResultHandle;
use crate::types::{RowValues, ServerVersion};

impl<C: MysqlClient> MysqlDbo<C> {
    /// Tables in the configured database, served from the source cache when one is attached.
    ///
    /// A failed listing is logged and yields an empty list; `last_error()` has the details.
    pub async fn list_sources(&mut self) -> Vec<String> {
        let key = self.options.identity();
        if let Some(cached) = self.source_cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!(key = %key, tables = cached.len(), "table list served from cache");
            return cached;
        }

        let sql = match self.options.database.as_deref().filter(|db| !db.is_empty()) {
            Some(database) => format!("SHOW TABLES FROM {};", self.name(database)),
            None => "SHOW TABLES;".to_string(),
        };
        let mut handle = match self.run_statement(&sql).await.map(ResultHandle::from_outcome) {
            Ok(Some(handle)) => handle,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to list tables");
                return Vec::new();
            }
        };

        let mut tables = Vec::with_capacity(handle.num_rows());
        while let Some(row) = handle.fetch_row() {
            if let Some(name) = row.first().and_then(RowValues::to_text) {
                tables.push(name);
            }
        }

        if let Some(cache) = &self.source_cache {
            cache.put(&key, tables.clone());
        }
        tables
    }

    /// Most recent native error as `"code: message"`.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_native_error().map(ToString::to_string)
    }

    #[must_use]
    pub fn last_native_error(&self) -> Option<&NativeError> {
        self.last_error.as_ref().filter(|err| err.code != 0)
    }

    /// Id generated by the most recent `INSERT` on this connection.
    pub async fn last_insert_id(&mut self) -> Option<u64> {
        let row = self
            .lookup_row("SELECT LAST_INSERT_ID() AS insertID")
            .await
            .ok()??;
        let id = match row.computed("insertID").or_else(|| row.first_value())? {
            RowValues::Int(id) => u64::try_from(*id).ok(),
            RowValues::Text(text) => text.trim().parse().ok(),
            _ => None,
        };
        id.filter(|id| *id != 0)
    }

    /// Character set a collation belongs to. Requires a 5.0+ server.
    pub async fn get_charset_name(&mut self, collation: &str) -> Option<String> {
        if self
            .server_version()
            .is_none_or(|version| version < ServerVersion::INFORMATION_SCHEMA)
        {
            return None;
        }

        let sql = format!(
            "SELECT CHARACTER_SET_NAME FROM INFORMATION_SCHEMA.COLLATIONS WHERE COLLATION_NAME = {};",
            self.value(&RowValues::Text(collation.to_string()), None, false)
        );
        let row = self.lookup_row(&sql).await.ok()??;
        row.get("COLLATIONS", "CHARACTER_SET_NAME")
            .or_else(|| row.first_value())
            .and_then(RowValues::to_text)
    }
}
