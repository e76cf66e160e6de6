use super::schema::MIGRATIONS;
use log::info;
use rusqlite::{Connection, Result};

/// Bring the schema up to date. Safe to call on every start.
pub fn run(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;

    for (index, migration) in MIGRATIONS.iter().enumerate() {
        let version = i64::try_from(index).unwrap_or(i64::MAX).saturating_add(1);
        if version <= current {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!("Applied schema migration v{version}");
    }
    Ok(())
}

/// Current `user_version` of the database.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Latest version known to this build.
pub fn latest_version() -> i64 {
    i64::try_from(MIGRATIONS.len()).unwrap_or(i64::MAX)
}
