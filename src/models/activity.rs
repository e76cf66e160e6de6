use super::{non_empty, Priority};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const COLUMNS: &str = "id, userId, name, date, startTime, endTime, status, category, priority, notes";

/// Activity status. Pending moves to Done on user action, or is projected
/// to Missed once its end time has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityStatus {
    #[default]
    Pending,
    Done,
    Missed,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Done => "Done",
            Self::Missed => "Missed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Done" => Some(Self::Done),
            "Missed" => Some(Self::Missed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Time of day, `HH:MM`.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: ActivityStatus,
    /// Category name copied at assignment time.
    pub category: Option<String>,
    /// Category priority copied at assignment time.
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

/// Editable activity fields. Status is not among them: activities start
/// Pending and only `Store::complete_activity` moves them to Done.
#[derive(Debug, Clone, Default)]
pub struct ActivityInput {
    pub name: String,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

/// Combine a `YYYY-MM-DD` day with an `HH:MM` time of day.
pub fn local_datetime(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time?.trim(), "%H:%M").ok()?;
    Some(day.and_time(time))
}

impl Activity {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let status: Option<String> = row.get(6)?;
        let priority: Option<String> = row.get(8)?;
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            date: row.get(3)?,
            start_time: non_empty(row.get(4)?),
            end_time: non_empty(row.get(5)?),
            status: status.as_deref().and_then(ActivityStatus::parse).unwrap_or_default(),
            category: non_empty(row.get(7)?),
            priority: priority.as_deref().and_then(Priority::parse),
            notes: non_empty(row.get(9)?),
        })
    }

    /// Absolute local start, if date and start time are both well formed.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        local_datetime(&self.date, self.start_time.as_deref())
    }

    /// Absolute local end, if date and end time are both well formed.
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        local_datetime(&self.date, self.end_time.as_deref())
    }

    /// Status as seen at `now`: anything not Done whose end has passed is Missed.
    pub fn effective_status(&self, now: NaiveDateTime) -> ActivityStatus {
        match self.status {
            ActivityStatus::Done => ActivityStatus::Done,
            ActivityStatus::Pending | ActivityStatus::Missed => match self.ends_at() {
                Some(end) if end < now => ActivityStatus::Missed,
                Some(_) | None => self.status,
            },
        }
    }

    /// Copy of this activity with its status projected to `now`. Not persisted.
    pub fn projected(mut self, now: NaiveDateTime) -> Self {
        self.status = self.effective_status(now);
        self
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM activities WHERE id = ?1"),
            params![id],
            Self::from_row,
        )
        .optional()
    }

    pub fn find_by_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM activities WHERE userId = ?1
             ORDER BY date, COALESCE(NULLIF(startTime, ''), '99:99'), id"
        ))?;
        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect()
    }

    pub fn find_by_user_on(conn: &Connection, user_id: i64, date: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM activities WHERE userId = ?1 AND date = ?2
             ORDER BY COALESCE(NULLIF(startTime, ''), '99:99'), id"
        ))?;
        let rows = stmt.query_map(params![user_id, date], Self::from_row)?;
        rows.collect()
    }

    pub fn insert(conn: &Connection, user_id: i64, input: &ActivityInput) -> Result<Self> {
        let status = ActivityStatus::Pending;
        conn.execute(
            "INSERT INTO activities
             (userId, name, date, startTime, endTime, status, category, priority, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                input.name,
                input.date,
                input.start_time,
                input.end_time,
                status.as_str(),
                input.category,
                input.priority.map(Priority::as_str),
                input.notes,
            ],
        )?;
        Ok(Self {
            id: conn.last_insert_rowid(),
            user_id,
            name: input.name.clone(),
            date: input.date.clone(),
            start_time: input.start_time.clone(),
            end_time: input.end_time.clone(),
            status,
            category: input.category.clone(),
            priority: input.priority,
            notes: input.notes.clone(),
        })
    }

    pub fn update(conn: &Connection, id: i64, input: &ActivityInput) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE activities
             SET name = ?1, date = ?2, startTime = ?3, endTime = ?4,
                 category = ?5, priority = ?6, notes = ?7
             WHERE id = ?8",
            params![
                input.name,
                input.date,
                input.start_time,
                input.end_time,
                input.category,
                input.priority.map(Priority::as_str),
                input.notes,
                id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn set_status(conn: &Connection, id: i64, status: ActivityStatus) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE activities SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Denormalize a category onto the activity.
    pub fn set_category(conn: &Connection, id: i64, category: &str, priority: Priority) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE activities SET category = ?1, priority = ?2 WHERE id = ?3",
            params![category, priority.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows_affected = conn.execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }
}
