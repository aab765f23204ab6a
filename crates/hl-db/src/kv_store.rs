use hl_core::cache::KvStore;
use hl_core::error::CacheError;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

const MIGRATION: &str = include_str!("../migrations/0001_init.sql");

/// SQLite-backed [`KvStore`]; the durable session cache of the CLI.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

fn backend(err: &rusqlite::Error) -> CacheError {
    CacheError::Backend {
        message: err.to_string(),
    }
}

impl SqliteKvStore {
    /// Opens (creating parent directories as needed) and migrates `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| CacheError::Backend {
                message: format!("create {}: {err}", parent.display()),
            })?;
        }
        let conn = Connection::open(path).map_err(|err| backend(&err))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|err| backend(&err))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|err| backend(&err))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(|err| backend(&err))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(MIGRATION).map_err(|err| backend(&err))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.lock()
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| backend(&err))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let sql = "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3) \
                   ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
        let now = chrono::Utc::now().to_rfc3339();
        self.lock()
            .execute(sql, (key, value, now))
            .map_err(|err| backend(&err))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock()
            .execute("DELETE FROM kv_entries WHERE key = ?1", [key])
            .map_err(|err| backend(&err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::SessionCache;
    use hl_core::types::{RequestKind, RequestRecord, RequestStatus};
    use std::sync::Arc;

    #[test]
    fn set_overwrites_and_remove_deletes() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(store.get("access_token").unwrap(), None);

        store.set("access_token", "one").unwrap();
        store.set("access_token", "two").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("two"));

        store.remove("access_token").unwrap();
        store.remove("never_set").unwrap();
        assert_eq!(store.get("access_token").unwrap(), None);
    }

    #[test]
    fn values_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        {
            let store = SqliteKvStore::open(&path).unwrap();
            let cache = SessionCache::new(Arc::new(store));
            cache.set_tokens("tok", Some("ref")).unwrap();
            cache
                .set_sent_mirror(
                    RequestKind::ContractorHire,
                    &[RequestRecord {
                        target_id: Some("C1".into()),
                        status: RequestStatus::Accepted,
                        chat_id: Some("chat-3".into()),
                        ..RequestRecord::default()
                    }],
                )
                .unwrap();
        }

        let cache = SessionCache::new(Arc::new(SqliteKvStore::open(&path).unwrap()));
        assert_eq!(cache.access_token().unwrap().as_deref(), Some("tok"));
        let mirror = cache.sent_mirror(RequestKind::ContractorHire).unwrap().unwrap();
        assert_eq!(mirror[0].chat_id.as_deref(), Some("chat-3"));
        assert_eq!(mirror[0].status, RequestStatus::Accepted);
    }
}
