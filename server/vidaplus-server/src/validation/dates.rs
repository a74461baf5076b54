//! Date and timestamp parsing for request fields

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ApiError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns a validation error naming `field` when the text does not parse.
pub fn parse_calendar_date(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::validation(format!("Invalid {field}. Use the format YYYY-MM-DD")))
}

/// Rejects dates after `today`.
///
/// # Errors
///
/// Returns a validation error naming `field` for a future date.
pub fn validate_not_future(date: NaiveDate, today: NaiveDate, field: &str) -> Result<(), ApiError> {
    if date > today {
        return Err(ApiError::validation(format!("{field} cannot be in the future")));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DDTHH:MM:SS` appointment time, read as UTC, and rejects
/// times before `now`.
///
/// # Errors
///
/// Returns a validation error for malformed or past timestamps.
pub fn parse_appointment_time(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ApiError> {
    let scheduled = NaiveDateTime::parse_from_str(value.trim(), DATE_TIME_FORMAT)
        .map_err(|_| {
            ApiError::validation("Invalid scheduled_at. Use the format YYYY-MM-DDTHH:MM:SS")
        })?
        .and_utc();

    if scheduled < now {
        return Err(ApiError::validation("Appointment cannot be scheduled in the past"));
    }
    Ok(scheduled)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_calendar_dates() {
        assert_eq!(
            parse_calendar_date("1990-05-17", "birth_date").unwrap(),
            NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()
        );
        let err = parse_calendar_date("17/05/1990", "birth_date").unwrap_err();
        assert_eq!(err.to_string(), "Invalid birth_date. Use the format YYYY-MM-DD");
    }

    #[test]
    fn future_dates_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        assert!(validate_not_future(today, today, "Birth date").is_ok());
        assert_eq!(
            validate_not_future(tomorrow, today, "Birth date").unwrap_err().to_string(),
            "Birth date cannot be in the future"
        );
    }

    #[test]
    fn appointment_time_must_not_be_past() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();

        let later = parse_appointment_time("2025-01-10T14:30:00", now).unwrap();
        assert_eq!(later, Utc.with_ymd_and_hms(2025, 1, 10, 14, 30, 0).unwrap());

        assert!(parse_appointment_time("2025-01-10T11:59:59", now).is_err());
        assert!(parse_appointment_time("2025-01-10 14:30", now).is_err());
    }
}
