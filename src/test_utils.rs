//! Shared test utilities for daytrack.
//!
//! This module provides common setup functions used across test modules.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::models::activity::local_datetime;
use crate::models::{ActivityInput, UserInput};
use chrono::NaiveDateTime;
use crate::password::PasswordStorage;
use crate::store::Store;
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Open a store over a temporary database. Passwords are kept in cleartext so
/// tests stay fast; hashing is covered in `password`.
pub fn setup_test_store() -> (Store, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test store");
    let store = Store::open(&dir.path().join("test.db"), PasswordStorage::Cleartext)
        .expect("Failed to open test store");
    (store, dir)
}

/// A valid registration for `user_name`, with a matching email.
pub fn sample_user(user_name: &str) -> UserInput {
    UserInput {
        id: None,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{user_name}@example.com"),
        mobile_number: "0123456789".to_string(),
        birth_day: "1990-05-17".to_string(),
        gender: "Other".to_string(),
        user_name: user_name.to_string(),
        password: "secret-pass".to_string(),
        photo_uri: None,
    }
}

/// A pending activity on `date` between `start` and `end`.
pub fn sample_activity(name: &str, date: &str, start: Option<&str>, end: Option<&str>) -> ActivityInput {
    ActivityInput {
        name: name.to_string(),
        date: date.to_string(),
        start_time: start.map(str::to_string),
        end_time: end.map(str::to_string),
        ..ActivityInput::default()
    }
}

/// Local wall-clock instant for `YYYY-MM-DD` and `HH:MM`.
pub fn at(date: &str, time: &str) -> NaiveDateTime {
    local_datetime(date, Some(time)).expect("valid test date and time")
}
