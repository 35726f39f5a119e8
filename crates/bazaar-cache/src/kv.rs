//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use bazaar_db::{params, Db, Executor, Value};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const KV_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key   TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
);";

#[derive(Clone)]
enum Backend {
    Memory(Arc<Mutex<HashMap<String, Vec<u8>>>>),
    Sqlite(Db),
}

/// Type-safe cache over a raw byte store.
///
/// Values are JSON-encoded, so anything implementing `Serialize` and
/// `DeserializeOwned` can be stored. Clones share the same backing store.
#[derive(Clone)]
pub struct Cache {
    backend: Backend,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.backend {
            Backend::Memory(_) => "memory",
            Backend::Sqlite(_) => "sqlite",
        };
        f.debug_struct("Cache").field("backend", &kind).finish()
    }
}

impl Cache {
    /// Open a process-local in-memory store.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    /// Open a store persisted in the `kv_store` table of a SQLite database.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::sqlite(db.clone())?;
    /// ```
    pub fn sqlite(db: Db) -> Result<Self, CacheError> {
        db.execute_batch(KV_SCHEMA)
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self {
            backend: Backend::Sqlite(db),
        })
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cart: Option<Cart> = cache.get("session:abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set_raw(key, bytes)
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Memory(map) => {
                lock(map)?.remove(key);
            }
            Backend::Sqlite(db) => {
                db.execute("DELETE FROM kv_store WHERE key = ?", params![key])?;
            }
        }
        Ok(())
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get_raw(key)?.is_some())
    }

    /// Replace the raw bytes under `key` only if they still equal `expected`
    /// (`None` meaning the key must be absent). Returns whether the write
    /// happened.
    pub(crate) fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
    ) -> Result<bool, CacheError> {
        match &self.backend {
            Backend::Memory(map) => {
                let mut map = lock(map)?;
                if map.get(key).map(Vec::as_slice) != expected {
                    return Ok(false);
                }
                map.insert(key.to_string(), new);
                Ok(true)
            }
            Backend::Sqlite(db) => db.transaction(|tx| {
                let current = read_blob(tx, key)?;
                if current.as_deref() != expected {
                    return Ok(false);
                }
                upsert(tx, key, new)?;
                Ok(true)
            }),
        }
    }

    pub(crate) fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match &self.backend {
            Backend::Memory(map) => Ok(lock(map)?.get(key).cloned()),
            Backend::Sqlite(db) => read_blob(db, key),
        }
    }

    fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Memory(map) => {
                lock(map)?.insert(key.to_string(), bytes);
                Ok(())
            }
            Backend::Sqlite(db) => upsert(db, key, bytes),
        }
    }
}

fn lock(
    map: &Mutex<HashMap<String, Vec<u8>>>,
) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
    map.lock()
        .map_err(|_| CacheError::StoreError("memory store poisoned".to_string()))
}

fn read_blob(exec: &impl Executor, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
    let result = exec.query("SELECT value FROM kv_store WHERE key = ?", params![key])?;
    Ok(result
        .first()
        .and_then(|row| row.get_index(0))
        .and_then(|value| match value {
            Value::Blob(bytes) => Some(bytes.clone()),
            Value::Text(text) => Some(text.clone().into_bytes()),
            _ => None,
        }))
}

fn upsert(exec: &impl Executor, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
    exec.execute(
        "INSERT INTO kv_store (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, bytes],
    )?;
    Ok(())
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("session", session_id);
/// // Returns "session:sess_..."
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Cache> {
        vec![
            Cache::in_memory(),
            Cache::sqlite(Db::open_in_memory().unwrap()).unwrap(),
        ]
    }

    #[test]
    fn test_set_get_delete() {
        for cache in backends() {
            cache.set("k", &vec![1, 2, 3]).unwrap();
            assert_eq!(cache.get::<Vec<i32>>("k").unwrap(), Some(vec![1, 2, 3]));
            assert!(cache.exists("k").unwrap());

            cache.delete("k").unwrap();
            assert_eq!(cache.get::<Vec<i32>>("k").unwrap(), None);
            assert!(!cache.exists("k").unwrap());
        }
    }

    #[test]
    fn test_compare_and_swap() {
        for cache in backends() {
            assert!(cache.compare_and_swap("k", None, b"a".to_vec()).unwrap());
            assert!(!cache.compare_and_swap("k", None, b"b".to_vec()).unwrap());
            assert!(cache
                .compare_and_swap("k", Some(&b"a"[..]), b"c".to_vec())
                .unwrap());
            assert_eq!(cache.get_raw("k").unwrap(), Some(b"c".to_vec()));
        }
    }

    #[test]
    fn test_clones_share_store() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set("shared", &"yes").unwrap();
        assert_eq!(other.get::<String>("shared").unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("session", "abc"), "session:abc");
        assert_eq!(cache_key!("a", 1, "b"), "a:1:b");
    }
}
