use super::non_empty;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const COLUMNS: &str = "id, firstName, lastName, email, mobileNumber, birthDay, gender, userName,
     password, photoUri, cloudId, synced, syncAttempts, syncError, syncFailed";

/// A locally registered user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub birth_day: String,
    pub gender: String,
    pub user_name: String,
    /// Stored credential: a PHC hash, or cleartext under the legacy policy.
    pub password: String,
    pub photo_uri: Option<String>,
    /// Identifier assigned by the remote service once uploaded.
    pub cloud_id: Option<String>,
    pub synced: bool,
    pub sync_attempts: i64,
    pub sync_error: Option<String>,
    /// Terminal upload failure; excluded from sync passes until reset.
    pub sync_failed: bool,
}

/// Profile fields supplied on registration or profile edit.
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    /// Local id of the record being edited, if known.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub birth_day: String,
    pub gender: String,
    pub user_name: String,
    /// Plaintext password as typed by the user.
    pub password: String,
    pub photo_uri: Option<String>,
}

impl User {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            mobile_number: row.get(4)?,
            birth_day: row.get(5)?,
            gender: row.get(6)?,
            user_name: row.get(7)?,
            password: row.get(8)?,
            photo_uri: non_empty(row.get(9)?),
            cloud_id: non_empty(row.get(10)?),
            synced: row.get::<_, Option<i64>>(11)?.unwrap_or(0) != 0,
            sync_attempts: row.get(12)?,
            sync_error: row.get(13)?,
            sync_failed: row.get::<_, i64>(14)? != 0,
        })
    }

    fn query_many(conn: &Connection, filter: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users {filter}"))?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// Find the user whose login name or email equals `login`.
    /// A login-name match wins over an email match.
    pub fn find_by_login(conn: &Connection, login: &str) -> Result<Option<Self>> {
        conn.query_row(
            &format!(
                "SELECT {COLUMNS} FROM users WHERE userName = ?1 OR email = ?1
                 ORDER BY (userName = ?1) DESC LIMIT 1"
            ),
            params![login],
            Self::from_row,
        )
        .optional()
    }

    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        Self::query_many(conn, "ORDER BY id")
    }

    pub fn find_first(conn: &Connection) -> Result<Option<Self>> {
        Ok(Self::query_many(conn, "ORDER BY id LIMIT 1")?.into_iter().next())
    }

    /// Users waiting for upload: not synced and not terminally failed.
    pub fn find_unsynced(conn: &Connection) -> Result<Vec<Self>> {
        Self::query_many(conn, "WHERE COALESCE(synced, 0) = 0 AND syncFailed = 0 ORDER BY id")
    }

    /// Id of the record an upsert targets: same local id or same login name.
    pub fn find_upsert_target(conn: &Connection, id: Option<i64>, user_name: &str) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT id FROM users WHERE id = ?1 OR userName = ?2 ORDER BY (id = ?1) DESC LIMIT 1",
            params![id, user_name],
            |row| row.get(0),
        )
        .optional()
    }

    /// Which unique field (`email` or `userName`) another user already holds.
    pub fn find_conflict(
        conn: &Connection,
        email: &str,
        user_name: &str,
        exclude_id: i64,
    ) -> Result<Option<&'static str>> {
        let other: Option<(String, String)> = conn
            .query_row(
                "SELECT email, userName FROM users WHERE (email = ?1 OR userName = ?2) AND id != ?3 LIMIT 1",
                params![email, user_name, exclude_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(other.map(|(other_email, _)| if other_email == email { "email" } else { "userName" }))
    }

    pub fn insert(conn: &Connection, input: &UserInput, credential: &str) -> Result<i64> {
        conn.execute(
            "INSERT INTO users
             (firstName, lastName, email, mobileNumber, birthDay, gender, userName, password, photoUri)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                input.first_name,
                input.last_name,
                input.email,
                input.mobile_number,
                input.birth_day,
                input.gender,
                input.user_name,
                credential,
                input.photo_uri,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite profile fields. Identity and sync state are left untouched.
    pub fn update_profile(conn: &Connection, id: i64, input: &UserInput, credential: &str) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE users
             SET firstName = ?1, lastName = ?2, email = ?3, mobileNumber = ?4,
                 birthDay = ?5, gender = ?6, userName = ?7, password = ?8, photoUri = ?9
             WHERE id = ?10",
            params![
                input.first_name,
                input.last_name,
                input.email,
                input.mobile_number,
                input.birth_day,
                input.gender,
                input.user_name,
                credential,
                input.photo_uri,
                id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn set_credential(conn: &Connection, id: i64, credential: &str) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE users SET password = ?1 WHERE id = ?2",
            params![credential, id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn mark_synced(conn: &Connection, id: i64, cloud_id: &str) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE users SET synced = 1, cloudId = ?1, syncError = NULL, syncFailed = 0 WHERE id = ?2",
            params![cloud_id, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Count a failed upload. The row turns terminal when `permanent` is set
    /// or the attempt count reaches `max_attempts`.
    pub fn record_sync_failure(
        conn: &Connection,
        id: i64,
        error: &str,
        permanent: bool,
        max_attempts: Option<u32>,
    ) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE users
             SET syncAttempts = syncAttempts + 1,
                 syncError = ?2,
                 syncFailed = CASE
                     WHEN ?3 = 1 OR (?4 IS NOT NULL AND syncAttempts + 1 >= ?4) THEN 1
                     ELSE syncFailed
                 END
             WHERE id = ?1 AND COALESCE(synced, 0) = 0",
            params![id, error, permanent, max_attempts],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn reset_sync_failure(conn: &Connection, id: i64) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE users SET syncFailed = 0, syncAttempts = 0, syncError = NULL WHERE id = ?1",
            params![id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize> {
        conn.execute("DELETE FROM users", [])
    }
}
