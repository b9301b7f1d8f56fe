use crate::utils::error::{RectifyError, Result};
use chrono_tz::Tz;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(RectifyError::invalid_input(
            field_name,
            value,
            "Value must be a finite number",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RectifyError::invalid_input(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Finite and within `[min, max]`; NaN slips through a bare range check.
pub fn validate_finite_range(field_name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    validate_range(field_name, value, min, max)
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value < 0.0 {
        return Err(RectifyError::invalid_input(
            field_name,
            value,
            "Value cannot be negative",
        ));
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value <= 0.0 {
        return Err(RectifyError::invalid_input(
            field_name,
            value,
            "Value must be greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RectifyError::invalid_input(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_latitude(value: f64) -> Result<()> {
    validate_finite_range("latitude", value, -90.0, 90.0)
}

pub fn validate_longitude(value: f64) -> Result<()> {
    validate_finite_range("longitude", value, -180.0, 180.0)
}

/// Resolves an IANA zone name such as `Asia/Kolkata`.
pub fn validate_timezone(field_name: &str, name: &str) -> Result<Tz> {
    validate_non_empty_string(field_name, name)?;
    name.trim().parse::<Tz>().map_err(|e| {
        RectifyError::invalid_input(field_name, name, format!("Unknown timezone: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.5).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_timezone() {
        assert_eq!(validate_timezone("timezone", "Asia/Kolkata").unwrap(), Tz::Asia__Kolkata);
        assert_eq!(validate_timezone("timezone", " UTC ").unwrap(), Tz::UTC);
        assert!(validate_timezone("timezone", "Mars/Olympus_Mons").is_err());
        assert!(validate_timezone("timezone", "").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("weight", 0.0).is_ok());
        assert!(validate_non_negative("weight", 2.5).is_ok());
        assert!(validate_non_negative("weight", -0.1).is_err());
        assert!(validate_positive("growth_rate", 0.0).is_err());
    }
}
