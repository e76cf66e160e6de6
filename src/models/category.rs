use super::non_empty;
use crate::db::schema::DEFAULT_CATEGORIES;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub priority: Priority,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    /// Defaults to Medium when omitted.
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

impl Category {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let priority: Option<String> = row.get(3)?;
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            priority: priority.as_deref().and_then(Priority::parse).unwrap_or_default(),
            notes: non_empty(row.get(4)?),
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, userId, name, priority, notes FROM categories WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// Categories of a user, newest first.
    pub fn find_by_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, userId, name, priority, notes FROM categories WHERE userId = ?1 ORDER BY id DESC"
        )?;
        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect()
    }

    pub fn count_for_user(conn: &Connection, user_id: i64) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE userId = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }

    /// Insert unless the user already has a category with this name.
    /// Returns `None` when the insert was ignored.
    pub fn insert_or_ignore(conn: &Connection, user_id: i64, input: &CategoryInput) -> Result<Option<Self>> {
        let priority = input.priority.unwrap_or_default();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO categories (userId, name, priority, notes) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, input.name, priority.as_str(), input.notes],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(Self {
            id: conn.last_insert_rowid(),
            user_id,
            name: input.name.clone(),
            priority,
            notes: input.notes.clone(),
        }))
    }

    pub fn update(conn: &Connection, id: i64, input: &CategoryInput) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE categories SET name = ?1, priority = ?2, notes = ?3 WHERE id = ?4",
            params![input.name, input.priority.unwrap_or_default().as_str(), input.notes, id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows_affected = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    /// Seed the default categories when the user has none. Returns how many
    /// were inserted.
    pub fn seed_defaults(conn: &Connection, user_id: i64) -> Result<usize> {
        if Self::count_for_user(conn, user_id)? > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for (name, priority) in DEFAULT_CATEGORIES {
            inserted += conn.execute(
                "INSERT OR IGNORE INTO categories (userId, name, priority, notes) VALUES (?1, ?2, ?3, NULL)",
                params![user_id, name, priority],
            )?;
        }
        Ok(inserted)
    }
}
