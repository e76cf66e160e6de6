pub mod clock;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod password;
pub mod store;
pub mod sync;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::ActivityStatus;
use crate::notify::{LocalTimerPlatform, NotificationScheduler};
use crate::store::Store;
use crate::sync::{spawn_reachability_probe, HttpRemote, SyncError, SyncReconciler};
use chrono::NaiveDateTime;
use log::{error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Error type for daytrack startup failures
#[derive(Debug)]
pub enum InitError {
    NoProjectDirs,
    DataDirCreation(std::io::Error),
    InvalidConfig { var: &'static str, reason: String },
    Store(AppError),
    HttpClient(SyncError),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::NoProjectDirs => write!(f, "Could not determine project directories"),
            InitError::DataDirCreation(e) => write!(f, "Could not create data directory: {e}"),
            InitError::InvalidConfig { var, reason } => write!(f, "Invalid {var}: {reason}"),
            InitError::Store(e) => write!(f, "Failed to open local store: {e}"),
            InitError::HttpClient(e) => write!(f, "Failed to set up HTTP client: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

/// Open the store at the configured path, creating its directory if needed.
pub fn open_store(config: &AppConfig) -> Result<Store, InitError> {
    if let Some(dir) = config.db_path.parent() {
        std::fs::create_dir_all(dir).map_err(InitError::DataDirCreation)?;
    }
    Store::open(&config.db_path, config.password_storage).map_err(InitError::Store)
}

/// Schedule notifications for every activity still Pending at `now`.
/// Done and already-Missed activities are left alone. Returns how many
/// activities got at least one notification.
pub async fn arm_notifications(store: &Store, scheduler: &NotificationScheduler, now: NaiveDateTime) -> usize {
    let mut armed = 0;
    for user in store.list_users() {
        for activity in store.list_activities_at(user.id, now) {
            if activity.status != ActivityStatus::Pending {
                continue;
            }
            if !scheduler.schedule_activity(&activity).await.is_empty() {
                armed += 1;
            }
        }
    }
    armed
}

/// Run the background service until Ctrl-C.
///
/// Opens the local store, arms notifications for pending activities, watches
/// the API host for reachability and uploads unsynced users each time it
/// comes back.
pub async fn run(config: AppConfig) -> Result<(), InitError> {
    let store = open_store(&config)?;
    info!("Using database at {}", config.db_path.display());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = NotificationScheduler::new(
        Arc::new(LocalTimerPlatform::new(Arc::clone(&clock))),
        Arc::clone(&clock),
    );
    let armed = arm_notifications(&store, &scheduler, clock.now()).await;
    info!("Armed notifications for {armed} activities");

    let remote = HttpRemote::new(&config.sync).map_err(InitError::HttpClient)?;
    info!("Uploading users to {}", remote.endpoint());

    let shutdown = CancellationToken::new();
    let connectivity = spawn_reachability_probe(&config.sync.api_url, config.sync.probe_interval, shutdown.clone());
    let reconciler = SyncReconciler::new(store.clone(), Arc::new(remote), config.sync);

    tokio::join!(
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Could not listen for shutdown signal: {e}");
            }
            info!("Shutting down");
            shutdown.cancel();
        },
        reconciler.run(connectivity, shutdown.clone()),
    );

    if let Err(e) = scheduler.cancel_all().await {
        warn!("Could not cancel pending notifications: {e}");
    }
    drop(reconciler);
    store.close().map_err(InitError::Store)
}
