//! Key-value repository contract and SQLite implementation.
//!
//! # Invariants
//! - `set` is an upsert keyed by `key`.
//! - `SqliteKvRepository::set_many` commits all pairs in one transaction.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage failure reported by a key-value repository.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Failure from a non-SQLite backend.
    Backend(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed, string-valued synchronous store.
pub trait KvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Writes several pairs. Backends with transactions should override this.
    fn set_many(&self, pairs: &[(&str, &str)]) -> RepoResult<()> {
        for (key, value) in pairs {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<R: KvRepository + ?Sized> KvRepository for &R {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> RepoResult<()> {
        (**self).set_many(pairs)
    }
}

const UPSERT_SQL: &str = "INSERT INTO kv_store (key, value, updated_at)
     VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at;";

/// SQLite-backed key-value repository over the `kv_store` table.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> RepoResult<()> {
        // `unchecked_transaction` because the repository only holds `&Connection`.
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
            for (key, value) in pairs {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
