//! SQLite-backed trigger index.
//!
//! Several named indexes can share one database file; every row is scoped by
//! `index_name`.

use crate::{IndexError, IndexResult, TriggerIndex};
use graphtrigger_types::EntityId;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub struct SqliteTriggerIndex {
    conn: Arc<Mutex<Connection>>,
    index_name: String,
}

impl SqliteTriggerIndex {
    /// Opens (or creates) an index stored at `path`.
    pub fn open(path: impl AsRef<Path>, index_name: impl Into<String>) -> IndexResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            IndexError::Storage(format!("failed to open trigger index {}: {e}", path.display()))
        })?;
        Self::with_connection(conn, index_name.into())
    }

    /// Opens an in-memory index (for testing).
    pub fn open_in_memory(index_name: impl Into<String>) -> IndexResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            IndexError::Storage(format!("failed to open in-memory trigger index: {e}"))
        })?;
        Self::with_connection(conn, index_name.into())
    }

    fn with_connection(conn: Connection, index_name: String) -> IndexResult<Self> {
        let index = Self {
            conn: Arc::new(Mutex::new(conn)),
            index_name,
        };
        index.init_schema()?;
        debug!(index = %index.index_name, "trigger index ready");
        Ok(index)
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn conn(&self) -> IndexResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| IndexError::Storage("trigger index connection poisoned".to_string()))
    }

    fn init_schema(&self) -> IndexResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS trigger_index (
                index_name TEXT NOT NULL,
                label TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                UNIQUE(index_name, label, entity_id)
            );
            ",
        )
        .map_err(|e| IndexError::Storage(format!("failed to init trigger index schema: {e}")))?;
        Ok(())
    }
}

impl TriggerIndex for SqliteTriggerIndex {
    fn put(&self, label: &str, id: EntityId) -> IndexResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO trigger_index (index_name, label, entity_id) VALUES (?1, ?2, ?3)",
            params![self.index_name, label, id.to_string()],
        )
        .map_err(|e| IndexError::Storage(format!("failed to index {id} under '{label}': {e}")))?;
        Ok(())
    }

    fn remove(&self, label: &str, id: EntityId) -> IndexResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM trigger_index WHERE index_name = ?1 AND label = ?2 AND entity_id = ?3",
            params![self.index_name, label, id.to_string()],
        )
        .map_err(|e| IndexError::Storage(format!("failed to unindex {id} from '{label}': {e}")))?;
        Ok(())
    }

    fn get_all(&self, label: &str) -> IndexResult<Vec<EntityId>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT entity_id FROM trigger_index WHERE index_name = ?1 AND label = ?2 ORDER BY entity_id")
            .map_err(|e| IndexError::Storage(format!("failed to prepare index query: {e}")))?;

        let rows = stmt
            .query_map(params![self.index_name, label], |row| row.get::<_, String>(0))
            .map_err(|e| IndexError::Storage(format!("failed to query index: {e}")))?;

        let mut ids = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| IndexError::Storage(format!("failed to read index row: {e}")))?;
            let id = EntityId::parse(&raw).map_err(|e| IndexError::Corrupt(format!("{raw}: {e}")))?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn labels(&self) -> IndexResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT label FROM trigger_index WHERE index_name = ?1 ORDER BY label")
            .map_err(|e| IndexError::Storage(format!("failed to prepare label query: {e}")))?;

        let labels = stmt
            .query_map(params![self.index_name], |row| row.get::<_, String>(0))
            .map_err(|e| IndexError::Storage(format!("failed to query labels: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IndexError::Storage(format!("failed to read label row: {e}")))?;
        Ok(labels)
    }
}
