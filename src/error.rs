use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{field} already belongs to another user")]
    Conflict { field: &'static str },

    #[error("'{name}' already exists")]
    AlreadyExists { name: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Password error: {0}")]
    Password(String),
}

impl AppError {
    pub fn storage(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::Storage { operation, source }
    }

    /// The underlying engine error, if this is a storage failure.
    pub fn engine_error(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::Conflict { .. }
            | Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::InvalidInput { .. }
            | Self::InvalidTransition { .. }
            | Self::Password(_) => None,
        }
    }
}

/// Check if a rusqlite error is a UNIQUE constraint violation
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// Check if a rusqlite error is a FOREIGN KEY constraint violation
pub fn is_fk_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// Name the unique column a violation refers to, from SQLite's message
/// (`UNIQUE constraint failed: users.email`).
pub fn unique_violation_column(e: &rusqlite::Error) -> Option<&'static str> {
    let rusqlite::Error::SqliteFailure(_, Some(message)) = e else {
        return None;
    };
    if message.contains("users.email") {
        Some("email")
    } else if message.contains("users.userName") {
        Some("userName")
    } else {
        None
    }
}
