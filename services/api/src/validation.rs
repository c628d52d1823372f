//! Input validation utilities
//!
//! Wire formats are checked with a regex first so malformed input and
//! impossible calendar values produce distinct messages; chrono then decides
//! whether the value actually exists (a `2024-02-30` passes the regex but is
//! not a date).

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::models::MAX_STAFF_PREFERENCES;

/// Upper bound on appointment notes
pub const MAX_NOTES_LENGTH: usize = 1000;

/// Validate a `YYYY-MM-DD` appointment date
pub fn validate_date(value: &str) -> Result<NaiveDate, String> {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DATE_REGEX
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Failed to compile date regex"));

    if !regex.is_match(value) {
        return Err("Appointment date must use the YYYY-MM-DD format".to_string());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Appointment date is not a valid calendar date".to_string())
}

/// Validate a `HH:MM` 24-hour time of day
pub fn validate_time(value: &str) -> Result<NaiveTime, String> {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = TIME_REGEX
        .get_or_init(|| Regex::new(r"^\d{2}:\d{2}$").expect("Failed to compile time regex"));

    if !regex.is_match(value) {
        return Err("Time must use the HH:MM 24-hour format".to_string());
    }

    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| "Time is not a valid time of day".to_string())
}

/// Validate a ranked staff preference list
pub fn validate_staff_preferences(preferences: &[Uuid]) -> Result<(), String> {
    if preferences.len() > MAX_STAFF_PREFERENCES {
        return Err(format!(
            "Staff preferences may contain at most {} entries",
            MAX_STAFF_PREFERENCES
        ));
    }

    Ok(())
}

/// Validate staff working hours; the end must be strictly after the start
/// when both are present.
pub fn validate_working_hours(
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> Result<(), String> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err("Working hours end must be after working hours start".to_string());
        }
    }

    Ok(())
}

/// Validate appointment notes
pub fn validate_notes(notes: &str) -> Result<(), String> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(format!(
            "Notes must be at most {} characters long",
            MAX_NOTES_LENGTH
        ));
    }

    Ok(())
}

/// Validate a service price
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err("Price must be a positive amount".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_date_parses() {
        assert_eq!(
            validate_date("2026-03-14").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_rejected_by_format() {
        let err = validate_date("14-03-2026").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
        assert!(validate_date("2026/03/14").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_impossible_calendar_date_rejected() {
        // Matches the regex but does not exist.
        let err = validate_date("2024-02-30").unwrap_err();
        assert!(err.contains("calendar"));
        assert!(validate_date("2025-02-29").is_err());
        // A real leap day is fine.
        assert!(validate_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_valid_time_parses() {
        assert_eq!(
            validate_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("00:00").is_ok());
    }

    #[test]
    fn test_invalid_time_rejected() {
        assert!(validate_time("9:30").is_err());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("12:60").is_err());
        assert!(validate_time("noonish").is_err());
    }

    #[test]
    fn test_staff_preferences_cap() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        assert!(validate_staff_preferences(&ids[..3]).is_ok());
        assert!(validate_staff_preferences(&[]).is_ok());

        let err = validate_staff_preferences(&ids).unwrap_err();
        assert!(err.contains("at most 3"));
    }

    #[test]
    fn test_working_hours_ordering() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        let five = NaiveTime::from_hms_opt(17, 0, 0);

        assert!(validate_working_hours(nine, five).is_ok());
        assert!(validate_working_hours(five, nine).is_err());
        assert!(validate_working_hours(nine, nine).is_err());
        // A single bound is allowed.
        assert!(validate_working_hours(nine, None).is_ok());
        assert!(validate_working_hours(None, five).is_ok());
    }

    #[test]
    fn test_notes_length() {
        assert!(validate_notes("see you then").is_ok());
        assert!(validate_notes(&"x".repeat(MAX_NOTES_LENGTH)).is_ok());
        assert!(validate_notes(&"x".repeat(MAX_NOTES_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(validate_price(25.0).is_ok());
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-5.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
    }
}
