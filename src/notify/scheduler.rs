use super::{
    plan_triggers, EndTrigger, NotificationContent, NotificationError, NotificationHandle, NotificationPlatform,
    ScheduledNotification,
};
use crate::clock::Clock;
use crate::models::Activity;
use log::{debug, warn};
use std::sync::Arc;

/// Handles of the notifications scheduled for one activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityHandles {
    pub start: Option<NotificationHandle>,
    pub end: Option<NotificationHandle>,
}

impl ActivityHandles {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

pub struct NotificationScheduler {
    platform: Arc<dyn NotificationPlatform>,
    clock: Arc<dyn Clock>,
}

impl NotificationScheduler {
    pub fn new(platform: Arc<dyn NotificationPlatform>, clock: Arc<dyn Clock>) -> Self {
        Self { platform, clock }
    }

    /// Schedule start and expiry notifications for `activity`.
    ///
    /// An end that has already passed is presented immediately and gets no
    /// handle. Platform failures are logged and leave the handle empty.
    pub async fn schedule_activity(&self, activity: &Activity) -> ActivityHandles {
        let plan = plan_triggers(activity, self.clock.now());
        let mut handles = ActivityHandles::default();

        if let Some(start) = plan.start {
            handles.start = self
                .platform
                .schedule_at(NotificationContent::started(&activity.name), start)
                .await
                .map_err(|e| warn!("Could not schedule start of activity {}: {e}", activity.id))
                .ok();
        }

        match plan.end {
            Some(EndTrigger::At(end)) => {
                handles.end = self
                    .platform
                    .schedule_at(NotificationContent::expired(&activity.name), end)
                    .await
                    .map_err(|e| warn!("Could not schedule expiry of activity {}: {e}", activity.id))
                    .ok();
            }
            Some(EndTrigger::ExpiredNow) => {
                if let Err(e) = self.platform.present_now(NotificationContent::expired(&activity.name)).await {
                    warn!("Could not present expiry of activity {}: {e}", activity.id);
                }
            }
            None => {}
        }

        debug!("Activity {} notifications: {handles:?}", activity.id);
        handles
    }

    /// Cancel whatever `handles` holds. Failures are logged and swallowed.
    pub async fn cancel_activity(&self, handles: &ActivityHandles) {
        for handle in [&handles.start, &handles.end].into_iter().flatten() {
            if let Err(e) = self.platform.cancel(handle).await {
                debug!("Ignoring failed cancel of {handle}: {e}");
            }
        }
    }

    pub async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.platform.cancel_all().await
    }

    pub async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        self.platform.list_scheduled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::ActivityStatus;
    use crate::test_utils::at;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Schedule(String, NaiveDateTime),
        Present(String),
        Cancel(String),
    }

    /// Records calls; `cancel` always fails.
    #[derive(Default)]
    struct RecordingPlatform {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingPlatform {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationPlatform for RecordingPlatform {
        async fn schedule_at(
            &self,
            content: NotificationContent,
            at: NaiveDateTime,
        ) -> Result<NotificationHandle, NotificationError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Schedule(content.title, at));
            Ok(NotificationHandle(format!("h{}", calls.len())))
        }

        async fn present_now(&self, content: NotificationContent) -> Result<(), NotificationError> {
            self.calls.lock().unwrap().push(Call::Present(content.title));
            Ok(())
        }

        async fn cancel(&self, handle: &NotificationHandle) -> Result<(), NotificationError> {
            self.calls.lock().unwrap().push(Call::Cancel(handle.0.clone()));
            Err(NotificationError::Backend("already fired".into()))
        }

        async fn cancel_all(&self) -> Result<(), NotificationError> {
            Ok(())
        }

        async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
            Ok(Vec::new())
        }
    }

    fn run_activity() -> Activity {
        Activity {
            id: 7,
            user_id: 1,
            name: "Run".to_string(),
            date: "2025-01-10".to_string(),
            start_time: Some("09:00".to_string()),
            end_time: Some("10:00".to_string()),
            status: ActivityStatus::Pending,
            category: None,
            priority: None,
            notes: None,
        }
    }

    fn scheduler_at(now: NaiveDateTime) -> (NotificationScheduler, Arc<RecordingPlatform>) {
        let platform = Arc::new(RecordingPlatform::default());
        let scheduler = NotificationScheduler::new(
            Arc::clone(&platform) as Arc<dyn NotificationPlatform>,
            Arc::new(FixedClock::new(now)),
        );
        (scheduler, platform)
    }

    #[tokio::test]
    async fn test_before_start_schedules_both() {
        let (scheduler, platform) = scheduler_at(at("2025-01-10", "08:00"));
        let handles = scheduler.schedule_activity(&run_activity()).await;

        assert!(handles.start.is_some());
        assert!(handles.end.is_some());
        assert_eq!(
            platform.calls(),
            vec![
                Call::Schedule("Activity Started".into(), at("2025-01-10", "09:00")),
                Call::Schedule("Activity Expired".into(), at("2025-01-10", "10:00")),
            ]
        );
    }

    #[tokio::test]
    async fn test_during_activity_schedules_end_only() {
        let (scheduler, platform) = scheduler_at(at("2025-01-10", "09:30"));
        let handles = scheduler.schedule_activity(&run_activity()).await;

        assert!(handles.start.is_none());
        assert!(handles.end.is_some());
        assert_eq!(platform.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_after_end_presents_expiry_immediately() {
        let (scheduler, platform) = scheduler_at(at("2025-01-10", "11:00"));
        let handles = scheduler.schedule_activity(&run_activity()).await;

        assert!(handles.is_empty());
        assert_eq!(platform.calls(), vec![Call::Present("Activity Expired".into())]);
    }

    #[tokio::test]
    async fn test_cancel_failures_are_swallowed() {
        let (scheduler, platform) = scheduler_at(at("2025-01-10", "08:00"));
        let handles = scheduler.schedule_activity(&run_activity()).await;

        scheduler.cancel_activity(&handles).await;
        let cancels = platform.calls().into_iter().filter(|c| matches!(c, Call::Cancel(_))).count();
        assert_eq!(cancels, 2);

        scheduler.cancel_activity(&ActivityHandles::default()).await;
    }
}
