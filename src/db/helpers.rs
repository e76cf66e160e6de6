// src/db/helpers.rs

use crate::db::Database;
use crate::error::AppError;
use rusqlite::{Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock the database, recovering from poisoning if necessary.
///
/// The mutex is the single writer: every store operation holds it for the
/// duration of its statements and releases it before awaiting anything.
pub fn lock_db<'a>(db: &'a Arc<Mutex<Database>>, operation: &str) -> MutexGuard<'a, Database> {
    match db.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Database mutex was poisoned during {operation}, recovering");
            poisoned.into_inner()
        }
    }
}

/// Execute a database operation with proper lock handling and error mapping.
///
/// # Example
/// ```ignore
/// with_connection(&db, "list users", |conn| User::find_all(conn))
/// ```
pub fn with_connection<F, T>(
    db: &Arc<Mutex<Database>>,
    operation: &'static str,
    f: F,
) -> Result<T, AppError>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let db = lock_db(db, operation);
    f(db.connection()).map_err(|e| {
        log::error!("Failed to {operation}: {e}");
        AppError::storage(operation, e)
    })
}

/// Run `f` inside one transaction; it commits only when `f` returns `Ok`.
///
/// `f` returns `AppError` so it can abort with domain errors (conflicts,
/// missing rows) as well as engine failures.
pub fn with_transaction<F, T>(
    db: &Arc<Mutex<Database>>,
    operation: &'static str,
    f: F,
) -> Result<T, AppError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, AppError>,
{
    let db = lock_db(db, operation);
    let tx = db
        .connection()
        .unchecked_transaction()
        .map_err(|e| AppError::storage(operation, e))?;

    let value = f(&tx)?;

    tx.commit().map_err(|e| {
        log::error!("Failed to commit {operation}: {e}");
        AppError::storage(operation, e)
    })?;
    Ok(value)
}

/// Execute a read, degrading to the default value on failure.
pub fn read_or_default<F, T>(db: &Arc<Mutex<Database>>, operation: &'static str, f: F) -> T
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
    T: Default,
{
    with_connection(db, operation, f).unwrap_or_default()
}
