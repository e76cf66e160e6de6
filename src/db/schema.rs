/// Base tables. Column names are the persisted system-of-record layout.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    firstName TEXT NOT NULL,
    lastName TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    mobileNumber TEXT NOT NULL,
    birthDay TEXT NOT NULL,
    gender TEXT NOT NULL,
    userName TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    photoUri TEXT,
    cloudId TEXT,
    synced INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    userId INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    date TEXT NOT NULL,
    startTime TEXT,
    endTime TEXT,
    status TEXT DEFAULT 'Pending',
    category TEXT,
    priority TEXT,
    notes TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    userId INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    priority TEXT DEFAULT 'Medium',
    notes TEXT,
    UNIQUE(userId, name)
);

CREATE INDEX IF NOT EXISTS idx_activities_user_date ON activities(userId, date);
"#;

/// Sync bookkeeping on users.
pub const SCHEMA_V2: &str = r#"
ALTER TABLE users ADD COLUMN syncAttempts INTEGER NOT NULL DEFAULT 0;
ALTER TABLE users ADD COLUMN syncError TEXT;
ALTER TABLE users ADD COLUMN syncFailed INTEGER NOT NULL DEFAULT 0;

CREATE INDEX IF NOT EXISTS idx_users_unsynced ON users(synced, syncFailed);
"#;

/// Ordered migrations; position + 1 is the resulting `user_version`.
pub const MIGRATIONS: &[&str] = &[SCHEMA_V1, SCHEMA_V2];

/// Categories seeded for a user that has none: (name, priority).
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Work", "High"),
    ("Exercise", "Medium"),
    ("Study", "Low"),
];
