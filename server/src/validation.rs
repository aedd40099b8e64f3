//! Field-presence and format checks shared by every create/update path.
//!
//! All helpers return [`ApiError::Validation`] carrying the offending field so
//! that handlers can bail out with `?` before any row is touched.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ApiError, ApiResult};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex");
    /// Indian mobile numbers: 10 digits starting with 6-9.
    static ref MOBILE_RE: Regex = Regex::new(r"^[6-9]\d{9}$").expect("valid mobile regex");
    static ref PHONE_RE: Regex = Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone regex");
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// A required string: absent, `null` and blank all count as missing.
pub fn required_str(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

/// A required non-string value.
pub fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| missing(field))
}

/// An optional update of a required string: `None` passes through, blank is rejected.
pub fn non_blank(value: Option<String>, field: &str) -> ApiResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ApiError::validation(
            field,
            format!("{} must not be empty", field),
        )),
        other => Ok(other),
    }
}

/// Character limit matching the column width; `None` passes.
pub fn max_len(field: &str, value: Option<&str>, max: usize) -> ApiResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ApiError::validation(
            field,
            format!("{} must be at most {} characters", field, max),
        )),
        _ => Ok(()),
    }
}

pub fn missing(field: &str) -> ApiError {
    ApiError::validation(field, format!("Missing required field: {}", field))
}

pub fn validate_email(field: &str, email: &str) -> ApiResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ApiError::validation(field, "Invalid email format"))
    }
}

/// Email that may be left empty.
pub fn validate_optional_email(field: &str, email: &str) -> ApiResult<()> {
    if email.is_empty() {
        return Ok(());
    }
    validate_email(field, email)
}

pub fn validate_mobile(field: &str, phone: &str) -> ApiResult<()> {
    if MOBILE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ApiError::validation(
            field,
            "Invalid phone number format. Must be a valid Indian mobile number (10 digits starting with 6-9)",
        ))
    }
}

pub fn validate_phone(field: &str, phone: &str) -> ApiResult<()> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ApiError::validation(field, "Invalid phone number format"))
    }
}

pub fn parse_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        ApiError::validation(field, "Invalid date format. Use YYYY-MM-DD")
    })
}

/// Accepts `YYYY-MM-DD` or an ISO-8601 date-time and keeps the date part.
pub fn parse_date_or_datetime(field: &str, value: &str) -> ApiResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .map_err(|_| ApiError::validation(field, "Invalid date format. Use YYYY-MM-DD or ISO-8601"))
}

pub fn parse_time(field: &str, value: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| ApiError::validation(field, "Invalid time format. Use HH:MM"))
}

pub fn non_negative(field: &str, value: f64) -> ApiResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ApiError::validation(field, format!("{} must be a non-negative number", field)))
    }
}

pub fn non_negative_int(field: &str, value: i32) -> ApiResult<i32> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(ApiError::validation(field, format!("{} must not be negative", field)))
    }
}

pub fn positive_int(field: &str, value: i32) -> ApiResult<i32> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(ApiError::validation(field, format!("{} must be at least 1", field)))
    }
}

/// Enum membership: `parse` maps the raw string onto the enum.
pub fn one_of<T>(
    field: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
    message: &str,
) -> ApiResult<T> {
    parse(value).ok_or_else(|| ApiError::validation(field, message))
}

pub fn validate_password(password: &str) -> ApiResult<()> {
    let field = "password";
    if password.chars().count() < 8 {
        return Err(ApiError::validation(field, "Password must be at least 8 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::validation(
            field,
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ApiError::validation(
            field,
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(field, "Password must contain at least one number"));
    }
    Ok(())
}
