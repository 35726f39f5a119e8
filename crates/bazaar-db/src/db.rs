//! Database connection and query execution.

use crate::{DbError, QueryResult, Row, Value};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Anything that can run SQL: the shared [`Db`] handle or an open [`Tx`].
///
/// Stores are written against this trait so the same query code runs both
/// standalone and inside a transaction.
pub trait Executor {
    /// Execute a statement that doesn't return rows, returning the number of
    /// rows changed.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, DbError>;

    /// Execute an INSERT and return the new row id.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, DbError>;

    /// Execute a query and return raw results.
    fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError>;

    /// Execute a query and deserialize results into a vector.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let products: Vec<Product> = db.query_as(
    ///     "SELECT id, name, price FROM product WHERE price < ?",
    ///     params![10_000],
    /// )?;
    /// ```
    fn query_as<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>, DbError> {
        self.query(sql, params)?.deserialize_all()
    }

    /// Execute a query and return an optional single row.
    fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        self.query(sql, params)?
            .first()
            .map(Row::deserialize)
            .transpose()
    }

    /// Execute a query returning one integer (e.g. `COUNT(*)`).
    fn query_scalar(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let result = self.query(sql, params)?;
        let value = result
            .first()
            .and_then(|row| row.get_index(0))
            .ok_or(DbError::NotFound)?;
        match value {
            Value::Null => Ok(0),
            other => other
                .as_integer()
                .ok_or_else(|| DbError::TypeError(format!("expected integer, got {other:?}"))),
        }
    }
}

/// SQLite database handle.
///
/// Cheap to clone; all clones share one connection guarded by a mutex.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

impl Db {
    /// Open (or create) a database file.
    ///
    /// The special path `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| DbError::OpenError(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DbError::OpenError(e.to_string()))?;

        tracing::debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::open(":memory:")
    }

    /// Run several `;`-separated statements, e.g. schema creation.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    /// Run `f` inside a transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let order_id = db.transaction(|tx| {
    ///     let id = tx.insert("INSERT INTO \"order\" (reference) VALUES (?)", params!["QWERT"])?;
    ///     tx.execute("UPDATE product SET stock = stock - ? WHERE id = ?", params![2, 1])?;
    ///     Ok::<_, DbError>(id)
    /// })?;
    /// ```
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(DbError::from)?;
        let value = f(&Tx { conn: &*tx })?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }
}

impl Executor for Db {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, DbError> {
        let conn = self.lock()?;
        run_execute(&conn, sql, params)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let conn = self.lock()?;
        run_insert(&conn, sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let conn = self.lock()?;
        run_query(&conn, sql, params)
    }
}

/// An open transaction, handed to the closure of [`Db::transaction`].
pub struct Tx<'a> {
    conn: &'a Connection,
}

impl Executor for Tx<'_> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, DbError> {
        run_execute(self.conn, sql, params)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        run_insert(self.conn, sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        run_query(self.conn, sql, params)
    }
}

fn run_execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<usize, DbError> {
    let changed = conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
    Ok(changed)
}

fn run_insert(conn: &Connection, sql: &str, params: &[Value]) -> Result<i64, DbError> {
    conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
    Ok(conn.last_insert_rowid())
}

fn run_query(conn: &Connection, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    while let Some(row) = cursor.next()? {
        let values = (0..columns.len())
            .map(|i| row.get_ref(i).map(Value::from_sql_ref))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(Row::new(columns.clone(), values));
    }

    Ok(QueryResult::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        name: String,
        stock: i64,
    }

    fn db() -> Db {
        let db = Db::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE item (id INTEGER PRIMARY KEY, name TEXT UNIQUE, stock INTEGER);",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_insert_and_query_as() {
        let db = db();
        let id = db
            .insert("INSERT INTO item (name, stock) VALUES (?, ?)", params!["Lamp", 3])
            .unwrap();
        let items: Vec<Item> = db
            .query_as("SELECT id, name, stock FROM item", params![])
            .unwrap();
        assert_eq!(
            items,
            vec![Item {
                id,
                name: "Lamp".to_string(),
                stock: 3
            }]
        );
    }

    fn restock(exec: &impl Executor, name: &str, by: i64) -> Result<i64, DbError> {
        exec.execute("UPDATE item SET stock = stock + ? WHERE name = ?", params![by, name])?;
        exec.query_scalar("SELECT stock FROM item WHERE name = ?", params![name])
    }

    #[test]
    fn test_db_runs_through_executor() {
        let db = db();
        db.insert("INSERT INTO item (name, stock) VALUES (?, ?)", params!["Rug", 1])
            .unwrap();

        assert_eq!(restock(&db, "Rug", 4).unwrap(), 5);
        assert_eq!(
            db.execute("DELETE FROM item WHERE name = ?", params!["Rug"]).unwrap(),
            1
        );
        assert_eq!(db.execute("DELETE FROM item", params![]).unwrap(), 0);
    }

    #[test]
    fn test_query_optional_missing_row() {
        let db = db();
        let item: Option<Item> = db
            .query_optional("SELECT id, name, stock FROM item WHERE id = ?", params![42])
            .unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn test_unique_violation_is_reported() {
        let db = db();
        db.insert("INSERT INTO item (name, stock) VALUES (?, ?)", params!["Lamp", 1])
            .unwrap();
        let err = db
            .insert("INSERT INTO item (name, stock) VALUES (?, ?)", params!["Lamp", 2])
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = db();
        let result: Result<(), DbError> = db.transaction(|tx| {
            tx.insert("INSERT INTO item (name, stock) VALUES (?, ?)", params!["Desk", 1])?;
            Err(DbError::NotFound)
        });
        assert!(result.is_err());
        assert_eq!(db.query_scalar("SELECT COUNT(*) FROM item", params![]).unwrap(), 0);
    }

    #[test]
    fn test_transaction_commits() {
        let db = db();
        db.transaction(|tx| {
            tx.insert("INSERT INTO item (name, stock) VALUES (?, ?)", params!["Desk", 1])?;
            tx.execute("UPDATE item SET stock = stock - ? WHERE name = ?", params![3, "Desk"])?;
            Ok::<_, DbError>(())
        })
        .unwrap();
        let stock = db
            .query_scalar("SELECT stock FROM item WHERE name = ?", params!["Desk"])
            .unwrap();
        assert_eq!(stock, -2);
    }
}
