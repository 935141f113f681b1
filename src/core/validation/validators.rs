//! Reusable field validators
//!
//! Every validator receives the field label and the current text of the field.
//! Format validators let empty text through so that an empty required field
//! reports a single "required" message.

use chrono::NaiveDate;

/// Validator: field must hold non-blank text
pub fn required() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, value: &str| {
        if value.trim().is_empty() {
            Err(format!("'{}' is required", label))
        } else {
            Ok(())
        }
    }
}

/// Validator: text must parse as a finite decimal number
pub fn numeric() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, value: &str| {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match value.parse::<f64>() {
            Ok(num) if num.is_finite() => Ok(()),
            _ => Err(format!(
                "'{}' must be a number (current value: {})",
                label, value
            )),
        }
    }
}

/// Validator: text must parse as a whole number
pub fn integer() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, value: &str| {
        let value = value.trim();
        if value.is_empty() || value.parse::<i64>().is_ok() {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be a whole number (current value: {})",
                label, value
            ))
        }
    }
}

/// Validator: text must be a whole number that fits a container count
///
/// Negative values are left to [`non_negative`] so they report a single
/// message.
pub fn count() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, value: &str| {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match value.parse::<i64>() {
            Ok(num) if num > i64::from(u32::MAX) => Err(format!(
                "'{}' must not exceed {} (current value: {})",
                label,
                u32::MAX,
                value
            )),
            Ok(_) => Ok(()),
            Err(_) => Err(format!(
                "'{}' must be a whole number (current value: {})",
                label, value
            )),
        }
    }
}

/// Validator: number must not be negative
pub fn non_negative() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |label: &str, value: &str| {
        if let Ok(num) = value.trim().parse::<f64>() {
            if num < 0.0 {
                Err(format!(
                    "'{}' must not be negative (current value: {})",
                    label, num
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(()) // not a number, numeric() reports it
        }
    }
}

/// Validator: text must not exceed `max` characters
pub fn max_length(max: usize) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |label: &str, value: &str| {
        let len = value.chars().count();
        if len > max {
            Err(format!(
                "'{}' must not exceed {} characters (currently: {})",
                label, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: text must be a calendar date in `format`
pub fn date_format(
    format: impl Into<String>,
) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    let format = format.into();
    move |label: &str, value: &str| {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match NaiveDate::parse_from_str(value, &format) {
            Ok(_) => Ok(()),
            Err(_) => Err(format!(
                "'{}' must use the format {} (current value: {})",
                label, format, value
            )),
        }
    }
}
