//! Database layer for the blood bank.
//!
//! Row operations live on small extension traits (`HospitalRepo`,
//! `InventoryRepo`, ...) implemented for every [`Store`], so the same code
//! runs against a plain [`Database`] and inside a [`UnitOfWork`].

mod schema;
mod sql;
mod camps;
mod donations;
mod hospitals;
mod inventory;
mod requests;
mod users;

pub use schema::*;
pub use camps::*;
pub use donations::*;
pub use hospitals::*;
pub use inventory::*;
pub use requests::*;
pub use users::*;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use thiserror::Error;
use tracing::warn;

/// How long a writer waits for the store lock before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DbError {
    /// True when the store rejected a write for breaking a schema rule
    /// (foreign key, CHECK, NOT NULL, uniqueness).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DbError::Constraint(_) => true,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Anything statements can run against: a plain connection or an open
/// unit of work.
pub trait Store {
    fn conn(&self) -> &Connection;
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating it and its schema if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.configure(DEFAULT_BUSY_TIMEOUT)?;
        // journal_mode reports the resulting mode as a row
        let _mode: String = db
            .conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        db.initialize()?;
        Ok(db)
    }

    /// Connect to an already initialized database file.
    ///
    /// One connection per request; isolation between concurrent writers is
    /// left entirely to SQLite's locking.
    pub fn connect<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.configure(busy_timeout)?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.configure(DEFAULT_BUSY_TIMEOUT)?;
        db.initialize()?;
        Ok(db)
    }

    fn configure(&self, busy_timeout: Duration) -> DbResult<()> {
        self.conn.busy_timeout(busy_timeout)?;
        self.conn.pragma_update(None, "foreign_keys", true)?;
        Ok(())
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Begin a unit of work.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`), so two units of
    /// work never read the same stock and then both write it. Fails if a unit
    /// of work is already open on this connection.
    pub fn begin(&self) -> DbResult<UnitOfWork<'_>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Ok(UnitOfWork { tx })
    }

    /// Run `work` in a unit of work: commit on `Ok`, roll back on `Err`.
    pub fn unit_of_work<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&UnitOfWork<'_>) -> Result<T, E>,
    {
        let uow = self.begin()?;
        match work(&uow) {
            Ok(value) => {
                uow.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Store for Database {
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// An open write transaction. Dropping it without [`commit`](Self::commit)
/// rolls every change back.
pub struct UnitOfWork<'a> {
    tx: Transaction<'a>,
}

impl UnitOfWork<'_> {
    pub fn commit(self) -> DbResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> DbResult<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

impl Store for UnitOfWork<'_> {
    fn conn(&self) -> &Connection {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM camps", [], |row| row.get(0))
            .unwrap()
    }

    fn insert_camp(store: &impl Store, id: &str) -> DbResult<()> {
        store.conn().execute(
            "INSERT INTO camps (id, name, location, start_date, end_date, created_at, updated_at)
             VALUES (?1, 'Drive', 'Hall', '2024-01-01', '2024-01-02', 'x', 'x')",
            [id],
        )?;
        Ok(())
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in [
            "blood_requests",
            "camps",
            "donation_events",
            "hospitals",
            "inventory_batches",
            "users",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_unit_of_work_commits_on_ok() {
        let db = Database::open_in_memory().unwrap();
        let result: DbResult<()> = db.unit_of_work(|uow| insert_camp(uow, "c1"));
        assert!(result.is_ok());
        assert_eq!(table_count(&db), 1);
    }

    #[test]
    fn test_unit_of_work_rolls_back_on_err() {
        let db = Database::open_in_memory().unwrap();
        let result: DbResult<()> = db.unit_of_work(|uow| {
            insert_camp(uow, "c1")?;
            insert_camp(uow, "c2")?;
            Err(DbError::Constraint("abort".into()))
        });
        assert!(result.is_err());
        assert_eq!(table_count(&db), 0);
    }

    #[test]
    fn test_dropped_unit_of_work_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        {
            let uow = db.begin().unwrap();
            insert_camp(&uow, "c1").unwrap();
        }
        assert_eq!(table_count(&db), 0);
    }

    #[test]
    fn test_nested_unit_of_work_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let _outer = db.begin().unwrap();
        assert!(db.begin().is_err());
    }

    #[test]
    fn test_constraint_violation_detection() {
        let db = Database::open_in_memory().unwrap();
        insert_camp(&db, "c1").unwrap();
        let err = insert_camp(&db, "c1").unwrap_err();
        assert!(err.is_constraint_violation());
        assert!(!DbError::NotFound("x".into()).is_constraint_violation());
    }
}
