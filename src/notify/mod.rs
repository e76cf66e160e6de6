//! Start and expiry notifications for activities.
//!
//! Trigger times come from an activity's date and time-of-day fields. Delivery
//! is delegated to a [`NotificationPlatform`]; handles are kept by the caller
//! and are not persisted.

mod platform;
mod scheduler;
mod triggers;

pub use platform::{LocalTimerPlatform, NotificationPlatform};
pub use scheduler::{ActivityHandles, NotificationScheduler};
pub use triggers::{plan_triggers, EndTrigger, TriggerPlan};

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification backend failed: {0}")]
    Backend(String),

    #[error("Unknown notification handle {0}")]
    UnknownHandle(NotificationHandle),
}

/// Opaque id of a scheduled notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationHandle(pub String);

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    pub fn started(activity_name: &str) -> Self {
        Self {
            title: "Activity Started".to_string(),
            body: format!("{} has started.", display_name(activity_name)),
        }
    }

    pub fn expired(activity_name: &str) -> Self {
        Self {
            title: "Activity Expired".to_string(),
            body: format!("{} has expired.", display_name(activity_name)),
        }
    }
}

fn display_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() {
        "Your activity"
    } else {
        name
    }
}

/// A notification waiting for its trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub handle: NotificationHandle,
    pub fire_at: NaiveDateTime,
    pub content: NotificationContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_falls_back_to_generic_name() {
        assert_eq!(NotificationContent::started("Run").body, "Run has started.");
        assert_eq!(NotificationContent::expired("  ").body, "Your activity has expired.");
        assert_eq!(NotificationContent::expired("Run").title, "Activity Expired");
    }
}
