use super::{RemoteUsers, SyncConfig, UserUpload};
use crate::models::User;
use crate::store::Store;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::select;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Result of one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another pass was already running.
    Skipped,
    Completed { uploaded: usize, failed: usize },
    /// Stopped early by cancellation; counts cover the rows handled so far.
    Cancelled { uploaded: usize, failed: usize },
}

/// Uploads unsynced users whenever connectivity comes back.
pub struct SyncReconciler {
    store: Store,
    remote: Arc<dyn RemoteUsers>,
    config: SyncConfig,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncReconciler {
    pub fn new(store: Store, remote: Arc<dyn RemoteUsers>, config: SyncConfig) -> Self {
        Self {
            store,
            remote,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Start a pass on every transition to connected, including an initially
    /// connected state. Returns on cancellation or when the sender is dropped.
    pub async fn run(&self, mut connectivity: watch::Receiver<bool>, cancel: CancellationToken) {
        info!("Sync reconciler started");
        let mut was_connected = false;

        loop {
            let connected = *connectivity.borrow_and_update();
            if connected && !was_connected {
                info!("Connectivity restored, syncing users");
                let outcome = self.pass(&cancel).await;
                debug!("Sync pass finished: {outcome:?}");
            } else if !connected && was_connected {
                info!("Connectivity lost");
            }
            was_connected = connected;

            select! {
                () = cancel.cancelled() => break,
                changed = connectivity.changed() => {
                    if changed.is_err() {
                        debug!("Connectivity source closed");
                        break;
                    }
                }
            }
        }
        info!("Sync reconciler stopped");
    }

    /// Upload every unsynced user once. Returns `Skipped` if a pass is
    /// already in flight.
    pub async fn sync_pass(&self) -> SyncOutcome {
        self.pass(&CancellationToken::new()).await
    }

    async fn pass(&self, cancel: &CancellationToken) -> SyncOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sync pass already running, skipping");
            return SyncOutcome::Skipped;
        }
        let _guard = PassGuard(&self.in_flight);

        let pending = self.store.list_unsynced_users();
        if pending.is_empty() {
            return SyncOutcome::Completed { uploaded: 0, failed: 0 };
        }
        info!("Syncing {} user(s)", pending.len());

        let mut uploaded = 0;
        let mut failed = 0;
        for user in pending {
            if cancel.is_cancelled() {
                return SyncOutcome::Cancelled { uploaded, failed };
            }

            let upload = UserUpload::from_user(&user).await;
            let result = select! {
                biased;
                () = cancel.cancelled() => {
                    info!("Sync cancelled during upload of {}", user.user_name);
                    return SyncOutcome::Cancelled { uploaded, failed };
                }
                result = self.remote.create_user(upload) => result,
            };

            match result {
                Ok(remote_id) => {
                    if self.record_success(&user, &remote_id) {
                        uploaded += 1;
                    } else {
                        failed += 1;
                    }
                }
                Err(e) => {
                    let permanent = e.is_permanent();
                    warn!("Upload of user {} failed (permanent: {permanent}): {e}", user.user_name);
                    if let Err(store_err) =
                        self.store
                            .record_sync_failure(user.id, &e.to_string(), permanent, self.config.max_attempts)
                    {
                        error!("Could not record sync failure for user {}: {store_err}", user.id);
                    }
                    failed += 1;
                }
            }
        }

        info!("Sync pass done: {uploaded} uploaded, {failed} failed");
        SyncOutcome::Completed { uploaded, failed }
    }

    fn record_success(&self, user: &User, remote_id: &str) -> bool {
        match self.store.mark_user_synced(user.id, remote_id) {
            Ok(true) => true,
            Ok(false) => {
                warn!("User {} was removed while uploading", user.id);
                false
            }
            Err(e) => {
                error!("Uploaded user {} but could not mark it synced: {e}", user.id);
                false
            }
        }
    }
}
