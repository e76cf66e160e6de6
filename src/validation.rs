use crate::constants::{MAX_NAME_LEN, MAX_NOTES_LEN, MAX_USER_NAME_LEN, MIN_PASSWORD_LEN};
use crate::models::{ActivityInput, CategoryInput, UserInput};
use crate::error::AppError;
use chrono::NaiveDate;

/// Validate time format (HH:MM, 24-hour format).
pub fn validate_time_format(time: &str) -> Result<(), AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "time",
        reason: reason.into(),
    };

    let (hours, minutes) = time.split_once(':').ok_or_else(|| err("must be in HH:MM format"))?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(err("must be in HH:MM format"));
    }

    let hours: u32 = hours.parse().map_err(|_| err("invalid hours"))?;
    let minutes: u32 = minutes.parse().map_err(|_| err("invalid minutes"))?;

    if hours >= 24 {
        return Err(err("hours must be 00-23"));
    }
    if minutes >= 60 {
        return Err(err("minutes must be 00-59"));
    }

    Ok(())
}

/// Validate calendar day format (YYYY-MM-DD).
pub fn validate_date_format(field: &'static str, date: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::InvalidInput {
            field,
            reason: format!("'{date}' is not a YYYY-MM-DD date"),
        })
}

/// Validate a required display name.
pub fn validate_name<'a>(field: &'static str, name: &'a str) -> Result<&'a str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput {
            field,
            reason: "cannot be empty".into(),
        });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput {
            field,
            reason: format!("cannot exceed {MAX_NAME_LEN} characters"),
        });
    }
    Ok(name)
}

/// Validate login name: non-empty, no whitespace.
pub fn validate_user_name(user_name: &str) -> Result<(), AppError> {
    let err = |reason: String| AppError::InvalidInput { field: "userName", reason };

    if user_name.is_empty() {
        return Err(err("cannot be empty".into()));
    }
    if user_name.chars().any(char::is_whitespace) {
        return Err(err("cannot contain whitespace".into()));
    }
    if user_name.chars().count() > MAX_USER_NAME_LEN {
        return Err(err(format!("cannot exceed {MAX_USER_NAME_LEN} characters")));
    }
    Ok(())
}

/// Validate email shape (local@domain.tld). Deliverability is not checked.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let invalid = || AppError::InvalidInput {
        field: "email",
        reason: format!("'{email}' is not a valid address"),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        Some(_) | None => Err(invalid()),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput {
            field: "password",
            reason: format!("must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }
    Ok(())
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), AppError> {
    match notes {
        Some(notes) if notes.chars().count() > MAX_NOTES_LEN => Err(AppError::InvalidInput {
            field: "notes",
            reason: format!("cannot exceed {MAX_NOTES_LEN} characters"),
        }),
        Some(_) | None => Ok(()),
    }
}

/// Validate a registration or profile edit.
pub fn validate_user_input(input: &UserInput) -> Result<(), AppError> {
    validate_name("firstName", &input.first_name)?;
    validate_name("lastName", &input.last_name)?;
    validate_email(&input.email)?;
    validate_user_name(&input.user_name)?;
    validate_password(&input.password)?;
    validate_date_format("birthDay", &input.birth_day)?;
    if input.mobile_number.trim().is_empty() {
        return Err(AppError::InvalidInput {
            field: "mobileNumber",
            reason: "cannot be empty".into(),
        });
    }
    Ok(())
}

/// Validate an activity; when both times are set the end must follow the start.
pub fn validate_activity_input(input: &ActivityInput) -> Result<(), AppError> {
    validate_name("name", &input.name)?;
    validate_date_format("date", &input.date)?;
    if let Some(start) = input.start_time.as_deref() {
        validate_time_format(start)?;
    }
    if let Some(end) = input.end_time.as_deref() {
        validate_time_format(end)?;
    }
    if let (Some(start), Some(end)) = (input.start_time.as_deref(), input.end_time.as_deref()) {
        // HH:MM compares correctly as text
        if end <= start {
            return Err(AppError::InvalidInput {
                field: "endTime",
                reason: "must be after startTime".into(),
            });
        }
    }
    validate_notes(input.notes.as_deref())
}

pub fn validate_category_input(input: &CategoryInput) -> Result<(), AppError> {
    validate_name("name", &input.name)?;
    validate_notes(input.notes.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_activity, sample_user};

    #[test]
    fn test_validate_time_format_valid() {
        assert!(validate_time_format("09:00").is_ok());
        assert!(validate_time_format("23:59").is_ok());
        assert!(validate_time_format("00:00").is_ok());
    }

    #[test]
    fn test_validate_time_format_invalid() {
        assert!(validate_time_format("9:00").is_err());
        assert!(validate_time_format("25:00").is_err());
        assert!(validate_time_format("12:60").is_err());
        assert!(validate_time_format("1200").is_err());
        assert!(validate_time_format("é1:00").is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("date", "2025-01-10").is_ok());
        assert!(validate_date_format("date", "2025-02-30").is_err());
        assert!(validate_date_format("date", "10/01/2025").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada example@x.com").is_err());
    }

    #[test]
    fn test_validate_user_input() {
        assert!(validate_user_input(&sample_user("ada")).is_ok());

        let mut short_password = sample_user("ada");
        short_password.password = "abc".into();
        assert!(validate_user_input(&short_password).is_err());

        let mut spaced = sample_user("ada");
        spaced.user_name = "ada lovelace".into();
        assert!(validate_user_input(&spaced).is_err());
    }

    #[test]
    fn test_validate_activity_time_order() {
        assert!(validate_activity_input(&sample_activity("Run", "2025-01-10", Some("09:00"), Some("10:00"))).is_ok());
        assert!(validate_activity_input(&sample_activity("Run", "2025-01-10", Some("10:00"), Some("09:00"))).is_err());
        assert!(validate_activity_input(&sample_activity("Run", "2025-01-10", None, Some("09:00"))).is_ok());
        assert!(validate_activity_input(&sample_activity("", "2025-01-10", None, None)).is_err());
    }
}
