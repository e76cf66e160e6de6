use super::{map_user_write, Store};
use crate::db::{read_or_default, with_connection, with_transaction};
use crate::error::AppError;
use crate::models::{User, UserInput};
use crate::password::PasswordStorage;
use crate::validation::validate_user_input;
use log::{info, warn};

impl Store {
    /// Insert a new user, or update the one with the same local id or login
    /// name. Returns the row id.
    ///
    /// Updates never touch `id`, `cloudId` or sync state. An `email` or
    /// `userName` held by a different user fails with `Conflict` and leaves
    /// both rows unchanged.
    pub fn upsert_user(&self, input: &UserInput) -> Result<i64, AppError> {
        validate_user_input(input)?;
        let credential = self.passwords.protect(&input.password)?;

        with_transaction(&self.db, "save user", |tx| {
            let target = User::find_upsert_target(tx, input.id, &input.user_name)
                .map_err(|e| AppError::storage("save user", e))?;

            match target {
                Some(id) => {
                    let conflict = User::find_conflict(tx, &input.email, &input.user_name, id)
                        .map_err(|e| AppError::storage("save user", e))?;
                    if let Some(field) = conflict {
                        return Err(AppError::Conflict { field });
                    }
                    User::update_profile(tx, id, input, &credential)
                        .map_err(|e| map_user_write("update user", e))?;
                    info!("User {} updated", input.user_name);
                    Ok(id)
                }
                None => {
                    let id = User::insert(tx, input, &credential)
                        .map_err(|e| map_user_write("insert user", e))?;
                    info!("User {} saved", input.user_name);
                    Ok(id)
                }
            }
        })
    }

    /// Look up a user by login name (or email) and password. Absence, a wrong
    /// password and a failed read all return `None`.
    pub fn find_user_by_credentials(&self, login: &str, password: &str) -> Option<User> {
        let user = read_or_default(&self.db, "find user by login", |conn| User::find_by_login(conn, login))?;

        if !PasswordStorage::verify(password, &user.password) {
            return None;
        }

        if self.passwords.needs_upgrade(&user.password) {
            self.upgrade_credential(user.id, password);
        }
        Some(user)
    }

    /// Rewrite a legacy cleartext credential as a hash. Failures are logged;
    /// the login itself already succeeded.
    fn upgrade_credential(&self, user_id: i64, password: &str) {
        let result = self.passwords.protect(password).and_then(|credential| {
            with_connection(&self.db, "upgrade user credential", |conn| {
                User::set_credential(conn, user_id, &credential)
            })
        });
        match result {
            Ok(_) => info!("Upgraded stored credential of user {user_id}"),
            Err(e) => warn!("Could not upgrade credential of user {user_id}: {e}"),
        }
    }

    pub fn list_users(&self) -> Vec<User> {
        read_or_default(&self.db, "list users", User::find_all)
    }

    /// Any one user, used to resume a session on startup.
    pub fn get_any_user(&self) -> Option<User> {
        read_or_default(&self.db, "load first user", User::find_first)
    }

    pub fn get_user(&self, id: i64) -> Option<User> {
        read_or_default(&self.db, "load user", |conn| User::find_by_id(conn, id))
    }

    /// Users still waiting for upload.
    pub fn list_unsynced_users(&self) -> Vec<User> {
        read_or_default(&self.db, "list unsynced users", User::find_unsynced)
    }

    /// Record a successful upload. Idempotent; returns whether the user exists.
    pub fn mark_user_synced(&self, user_id: i64, remote_id: &str) -> Result<bool, AppError> {
        let found = with_connection(&self.db, "mark user synced", |conn| {
            User::mark_synced(conn, user_id, remote_id)
        })?;
        if found {
            info!("User {user_id} marked as synced");
        }
        Ok(found)
    }

    /// Record a failed upload. Returns whether an unsynced user was updated.
    pub fn record_sync_failure(
        &self,
        user_id: i64,
        error: &str,
        permanent: bool,
        max_attempts: Option<u32>,
    ) -> Result<bool, AppError> {
        with_connection(&self.db, "record sync failure", |conn| {
            User::record_sync_failure(conn, user_id, error, permanent, max_attempts)
        })
    }

    /// Make a terminally failed user eligible for upload again.
    pub fn reset_sync_failure(&self, user_id: i64) -> Result<bool, AppError> {
        with_connection(&self.db, "reset sync failure", |conn| User::reset_sync_failure(conn, user_id))
    }

    /// Remove every user along with their activities and categories.
    pub fn delete_all_users(&self) -> Result<usize, AppError> {
        let deleted = with_connection(&self.db, "delete all users", User::delete_all)?;
        info!("Deleted {deleted} users");
        Ok(deleted)
    }
}
