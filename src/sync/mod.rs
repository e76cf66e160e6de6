//! Deferred upload of locally registered users.
//!
//! Users are written locally first and uploaded once connectivity allows.
//! The reconciler walks every unsynced user, posts it to the remote service
//! and records the server id on success.

mod connectivity;
mod reconciler;
mod remote;

pub use connectivity::spawn_reachability_probe;
pub use reconciler::{SyncOutcome, SyncReconciler};
pub use remote::{HttpRemote, RemoteUsers, UserUpload};

use crate::error::AppError;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected upload with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API URL {url}: {source}")]
    InvalidEndpoint { url: String, source: url::ParseError },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl SyncError {
    /// Whether retrying the same upload can never succeed.
    ///
    /// Client errors are permanent, except 408 and 429 which ask the client
    /// to come back later. A bad endpoint never recovers without new config.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::InvalidEndpoint { .. } => true,
            Self::Rejected { status, .. } => {
                status.is_client_error()
                    && *status != StatusCode::REQUEST_TIMEOUT
                    && *status != StatusCode::TOO_MANY_REQUESTS
            }
            Self::Http(_) | Self::InvalidResponse(_) | Self::Store(_) => false,
        }
    }
}

/// Settings for the sync reconciler and its HTTP client.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the remote API, e.g. `https://api.example.com/`.
    pub api_url: url::Url,
    pub request_timeout: Duration,
    pub probe_interval: Duration,
    /// Give up on a user after this many failed uploads. `None` retries forever.
    pub max_attempts: Option<u32>,
}
