use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::error;

/// How user passwords are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordStorage {
    /// Argon2 PHC string.
    #[default]
    Hashed,
    /// Stored as typed. Only for servers that require the raw password on upload.
    Cleartext,
}

impl PasswordStorage {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hashed" => Some(Self::Hashed),
            "cleartext" => Some(Self::Cleartext),
            _ => None,
        }
    }

    /// Turn a typed password into the stored credential.
    pub fn protect(self, plain: &str) -> Result<String, AppError> {
        match self {
            Self::Hashed => hash_password(plain),
            Self::Cleartext => Ok(plain.to_string()),
        }
    }

    /// Check a typed password against a stored credential.
    ///
    /// PHC strings are verified as hashes and anything else is compared as
    /// cleartext, so rows written under either policy keep working.
    pub fn verify(plain: &str, stored: &str) -> bool {
        if is_hashed(stored) {
            return verify_password(plain, stored).unwrap_or(false);
        }
        plain == stored
    }

    /// Whether a stored credential should be rewritten under this policy.
    pub fn needs_upgrade(self, stored: &str) -> bool {
        self == Self::Hashed && !is_hashed(stored)
    }
}

/// Whether a stored credential is an argon2 PHC string.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!("argon2 hash_password error: {e}");
            AppError::Password(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!("argon2 parse hash error: {e}");
        AppError::Password(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
