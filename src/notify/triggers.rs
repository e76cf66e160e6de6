use crate::models::Activity;
use chrono::NaiveDateTime;

/// What to do about an activity's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTrigger {
    /// Schedule the expiry notification for this instant.
    At(NaiveDateTime),
    /// The end has already passed; notify right away.
    ExpiredNow,
}

/// Triggers derived from one activity at a given "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerPlan {
    pub start: Option<NaiveDateTime>,
    pub end: Option<EndTrigger>,
}

impl TriggerPlan {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Plan start and end triggers for `activity` as seen at `now`.
///
/// A start in the past is dropped. An end in the past becomes
/// [`EndTrigger::ExpiredNow`]. A missing or malformed date or time skips
/// that trigger.
pub fn plan_triggers(activity: &Activity, now: NaiveDateTime) -> TriggerPlan {
    let start = activity.starts_at().filter(|at| *at > now);
    let end = activity.ends_at().map(|at| {
        if at > now {
            EndTrigger::At(at)
        } else {
            EndTrigger::ExpiredNow
        }
    });
    TriggerPlan { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityStatus;
    use crate::test_utils::at;

    fn activity(date: &str, start: Option<&str>, end: Option<&str>) -> Activity {
        Activity {
            id: 1,
            user_id: 1,
            name: "Run".to_string(),
            date: date.to_string(),
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            status: ActivityStatus::Pending,
            category: None,
            priority: None,
            notes: None,
        }
    }

    #[test]
    fn test_before_start_plans_both() {
        let plan = plan_triggers(&activity("2025-01-10", Some("09:00"), Some("10:00")), at("2025-01-10", "08:00"));
        assert_eq!(plan.start, Some(at("2025-01-10", "09:00")));
        assert_eq!(plan.end, Some(EndTrigger::At(at("2025-01-10", "10:00"))));
    }

    #[test]
    fn test_during_activity_plans_end_only() {
        let plan = plan_triggers(&activity("2025-01-10", Some("09:00"), Some("10:00")), at("2025-01-10", "09:30"));
        assert_eq!(plan.start, None);
        assert_eq!(plan.end, Some(EndTrigger::At(at("2025-01-10", "10:00"))));
    }

    #[test]
    fn test_after_end_expires_now() {
        let plan = plan_triggers(&activity("2025-01-10", Some("09:00"), Some("10:00")), at("2025-01-10", "11:00"));
        assert_eq!(plan.start, None);
        assert_eq!(plan.end, Some(EndTrigger::ExpiredNow));
    }

    #[test]
    fn test_missing_or_malformed_fields_skip_triggers() {
        let now = at("2025-01-10", "08:00");
        assert!(plan_triggers(&activity("2025-01-10", None, None), now).is_empty());
        assert!(plan_triggers(&activity("not-a-date", Some("09:00"), Some("10:00")), now).is_empty());

        let plan = plan_triggers(&activity("2025-01-10", Some("9am"), Some("10:00")), now);
        assert_eq!(plan.start, None);
        assert!(plan.end.is_some());
    }
}
