use super::{NotificationContent, NotificationError, NotificationHandle, ScheduledNotification};
use crate::clock::Clock;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// A device notification service.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Register a one-shot notification for `at` (local time).
    async fn schedule_at(
        &self,
        content: NotificationContent,
        at: NaiveDateTime,
    ) -> Result<NotificationHandle, NotificationError>;

    /// Show a notification immediately.
    async fn present_now(&self, content: NotificationContent) -> Result<(), NotificationError>;

    async fn cancel(&self, handle: &NotificationHandle) -> Result<(), NotificationError>;

    async fn cancel_all(&self) -> Result<(), NotificationError>;

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError>;
}

struct Pending {
    notification: ScheduledNotification,
    task: AbortHandle,
}

type PendingMap = Arc<Mutex<HashMap<NotificationHandle, Pending>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<NotificationHandle, Pending>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process platform: one tokio timer per notification. Delivery is logged
/// and, if a sink is attached, forwarded to it.
pub struct LocalTimerPlatform {
    clock: Arc<dyn Clock>,
    pending: PendingMap,
    next_id: AtomicU64,
    sink: Option<mpsc::UnboundedSender<NotificationContent>>,
}

impl LocalTimerPlatform {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: Arc::default(),
            next_id: AtomicU64::new(1),
            sink: None,
        }
    }

    /// Also send every delivered notification to `sink`.
    pub fn with_sink(mut self, sink: mpsc::UnboundedSender<NotificationContent>) -> Self {
        self.sink = Some(sink);
        self
    }
}

fn deliver(content: NotificationContent, sink: Option<&mpsc::UnboundedSender<NotificationContent>>) {
    info!("Notification: {} - {}", content.title, content.body);
    if let Some(sink) = sink {
        // A closed sink only means nobody is listening
        let _ = sink.send(content);
    }
}

#[async_trait]
impl NotificationPlatform for LocalTimerPlatform {
    async fn schedule_at(
        &self,
        content: NotificationContent,
        at: NaiveDateTime,
    ) -> Result<NotificationHandle, NotificationError> {
        let handle = NotificationHandle(format!("local-{}", self.next_id.fetch_add(1, Ordering::Relaxed)));
        let delay = (at - self.clock.now()).to_std().unwrap_or(Duration::ZERO);

        // Hold the lock across spawn so the timer cannot remove its entry
        // before it is inserted.
        let mut pending = lock(&self.pending);
        let task = tokio::spawn({
            let handle = handle.clone();
            let content = content.clone();
            let map = Arc::clone(&self.pending);
            let sink = self.sink.clone();
            async move {
                tokio::time::sleep(delay).await;
                lock(&map).remove(&handle);
                deliver(content, sink.as_ref());
            }
        })
        .abort_handle();

        debug!("Scheduled {handle} at {at} (in {}s)", delay.as_secs());
        pending.insert(
            handle.clone(),
            Pending {
                notification: ScheduledNotification {
                    handle: handle.clone(),
                    fire_at: at,
                    content,
                },
                task,
            },
        );
        Ok(handle)
    }

    async fn present_now(&self, content: NotificationContent) -> Result<(), NotificationError> {
        deliver(content, self.sink.as_ref());
        Ok(())
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<(), NotificationError> {
        let removed = lock(&self.pending).remove(handle);
        match removed {
            Some(entry) => {
                entry.task.abort();
                debug!("Cancelled {handle}");
                Ok(())
            }
            None => Err(NotificationError::UnknownHandle(handle.clone())),
        }
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        let drained: Vec<Pending> = lock(&self.pending).drain().map(|(_, entry)| entry).collect();
        for entry in &drained {
            entry.task.abort();
        }
        debug!("Cancelled {} scheduled notification(s)", drained.len());
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        let mut scheduled: Vec<ScheduledNotification> =
            lock(&self.pending).values().map(|entry| entry.notification.clone()).collect();
        scheduled.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.handle.cmp(&b.handle)));
        Ok(scheduled)
    }
}
