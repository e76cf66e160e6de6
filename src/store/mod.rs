// src/store/mod.rs
//
// Store module - the local system of record, organized by entity.

mod activities;
mod categories;
mod users;

pub use activities::DailySummary;

use crate::db::{migrations, Database};
use crate::error::{is_unique_violation, unique_violation_column, AppError};
use crate::password::PasswordStorage;
use log::{info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Handle to the local database. Cheap to clone; every clone shares one
/// connection behind a mutex, which serializes all writers.
#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
    passwords: PasswordStorage,
}

impl Store {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn open(path: &Path, passwords: PasswordStorage) -> Result<Self, AppError> {
        let db = Database::open(path).map_err(|e| AppError::storage("open database", e))?;
        Self::from_database(db, passwords)
    }

    pub fn from_database(db: Database, passwords: PasswordStorage) -> Result<Self, AppError> {
        migrations::run(db.connection()).map_err(|e| AppError::storage("run migrations", e))?;
        info!("Local store ready (schema v{})", migrations::latest_version());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            passwords,
        })
    }

    /// Close the connection. If other handles are still alive the connection
    /// stays open until the last one is dropped.
    pub fn close(self) -> Result<(), AppError> {
        match Arc::try_unwrap(self.db) {
            Ok(mutex) => mutex
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .close()
                .map_err(|e| AppError::storage("close database", e)),
            Err(_) => {
                warn!("Store closed while still shared; connection closes with the last handle");
                Ok(())
            }
        }
    }

    pub fn password_storage(&self) -> PasswordStorage {
        self.passwords
    }

    #[cfg(test)]
    pub(crate) fn database(&self) -> &Arc<Mutex<Database>> {
        &self.db
    }
}

/// Map an engine error from a user write, turning uniqueness violations into
/// conflicts on the offending field.
fn map_user_write(operation: &'static str, e: rusqlite::Error) -> AppError {
    if is_unique_violation(&e) {
        let field = unique_violation_column(&e).unwrap_or("userName");
        return AppError::Conflict { field };
    }
    log::error!("Failed to {operation}: {e}");
    AppError::storage(operation, e)
}
