// src/constants.rs

/// Maximum length of user-facing names (activity, category, person names)
pub const MAX_NAME_LEN: usize = 100;

/// Maximum login name length
pub const MAX_USER_NAME_LEN: usize = 50;

/// Maximum notes length
pub const MAX_NOTES_LEN: usize = 2000;

/// Minimum password length accepted on registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Default timeout for a single remote request, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default interval between reachability probes, in seconds
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 10;

/// Remote endpoint that creates users
pub const USERS_ENDPOINT: &str = "api/users";

/// File name sent with an uploaded profile photo
pub const PHOTO_FILE_NAME: &str = "profile.jpg";

/// MIME type sent with an uploaded profile photo
pub const PHOTO_MIME_TYPE: &str = "image/jpeg";

/// API base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000/";
