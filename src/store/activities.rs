use super::Store;
use crate::db::{read_or_default, with_connection, with_transaction};
use crate::error::{is_fk_violation, AppError};
use crate::models::{Activity, ActivityInput, ActivityStatus, Category};
use crate::validation::validate_activity_input;
use chrono::NaiveDateTime;
use log::info;

/// One day of activities as the dashboard shows them.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: String,
    /// Activities of the day with status projected to "now".
    pub activities: Vec<Activity>,
    pub done: u32,
    pub total: u32,
    /// Share of Done activities, 0-100.
    pub completion_percent: f64,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl Store {
    /// Activities of a user as stored.
    pub fn list_activities(&self, user_id: i64) -> Vec<Activity> {
        read_or_default(&self.db, "load activities", |conn| Activity::find_by_user(conn, user_id))
    }

    /// Activities of a user with status projected to `now`. Nothing is written.
    pub fn list_activities_at(&self, user_id: i64, now: NaiveDateTime) -> Vec<Activity> {
        self.list_activities(user_id)
            .into_iter()
            .map(|activity| activity.projected(now))
            .collect()
    }

    pub fn daily_summary(&self, user_id: i64, date: &str, now: NaiveDateTime) -> DailySummary {
        let activities: Vec<Activity> =
            read_or_default(&self.db, "load daily activities", |conn| Activity::find_by_user_on(conn, user_id, date))
                .into_iter()
                .map(|activity| activity.projected(now))
                .collect();

        let done = count(activities.iter().filter(|a| a.status == ActivityStatus::Done).count());
        let total = count(activities.len());
        let completion_percent = if total == 0 {
            0.0
        } else {
            f64::from(done) * 100.0 / f64::from(total)
        };

        DailySummary {
            date: date.to_string(),
            activities,
            done,
            total,
            completion_percent,
        }
    }

    pub fn create_activity(&self, user_id: i64, input: &ActivityInput) -> Result<Activity, AppError> {
        validate_activity_input(input)?;
        let activity = with_connection(&self.db, "save activity", |conn| Activity::insert(conn, user_id, input))
            .map_err(|e| match e.engine_error() {
                Some(db_err) if is_fk_violation(db_err) => AppError::NotFound { entity: "User" },
                Some(_) | None => e,
            })?;
        info!("Activity saved: {}", activity.name);
        Ok(activity)
    }

    /// Overwrite an activity. Returns `false` when no activity has this id.
    pub fn update_activity(&self, id: i64, input: &ActivityInput) -> Result<bool, AppError> {
        validate_activity_input(input)?;
        let found = with_connection(&self.db, "update activity", |conn| Activity::update(conn, id, input))?;
        if found {
            info!("Activity updated: {id}");
        }
        Ok(found)
    }

    /// Returns `false` when no activity has this id.
    pub fn delete_activity(&self, id: i64) -> Result<bool, AppError> {
        let found = with_connection(&self.db, "delete activity", |conn| Activity::delete(conn, id))?;
        if found {
            info!("Activity deleted: {id}");
        }
        Ok(found)
    }

    /// Mark a pending activity Done. Done stays Done; an activity already
    /// Missed at `now` cannot be completed.
    pub fn complete_activity(&self, id: i64, now: NaiveDateTime) -> Result<ActivityStatus, AppError> {
        with_transaction(&self.db, "complete activity", |tx| {
            let activity = Activity::find_by_id(tx, id)
                .map_err(|e| AppError::storage("complete activity", e))?
                .ok_or(AppError::NotFound { entity: "Activity" })?;

            match activity.effective_status(now) {
                ActivityStatus::Done => Ok(ActivityStatus::Done),
                ActivityStatus::Missed => Err(AppError::InvalidTransition {
                    from: ActivityStatus::Missed.as_str(),
                    to: ActivityStatus::Done.as_str(),
                }),
                ActivityStatus::Pending => {
                    Activity::set_status(tx, id, ActivityStatus::Done)
                        .map_err(|e| AppError::storage("complete activity", e))?;
                    info!("Activity {id} done");
                    Ok(ActivityStatus::Done)
                }
            }
        })
    }

    /// Copy a category's name and priority onto an activity of the same user.
    pub fn assign_category(&self, activity_id: i64, category_id: i64) -> Result<Activity, AppError> {
        with_transaction(&self.db, "assign category", |tx| {
            let storage = |e| AppError::storage("assign category", e);

            let mut activity = Activity::find_by_id(tx, activity_id)
                .map_err(storage)?
                .ok_or(AppError::NotFound { entity: "Activity" })?;
            let category = Category::find_by_id(tx, category_id)
                .map_err(storage)?
                .filter(|c| c.user_id == activity.user_id)
                .ok_or(AppError::NotFound { entity: "Category" })?;

            Activity::set_category(tx, activity_id, &category.name, category.priority).map_err(storage)?;
            activity.category = Some(category.name);
            activity.priority = Some(category.priority);
            Ok(activity)
        })
    }
}
