//! Input validation utilities.
//!
//! Small checks shared by request and account creation. Anything that fails here is reported
//! as `CoreError::InvalidInput` before a record is stored or a donor contacted.

use crate::{CoreError, CoreResult};

/// Returns the trimmed value of a required field, or an error naming the field.
pub fn validate_required(field: &str, value: Option<String>) -> CoreResult<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::InvalidInput(format!("{field} is required")))
}

/// Trims an optional free-text field, mapping blank input to `None`.
pub fn validate_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Validates a requested quantity: present and at least one unit.
pub fn validate_quantity(quantity: Option<i64>) -> CoreResult<u32> {
    let quantity =
        quantity.ok_or_else(|| CoreError::InvalidInput("quantity is required".into()))?;

    u32::try_from(quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| CoreError::InvalidInput("quantity must be a positive integer".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(
            validate_required("name", Some(" x ".into())).unwrap(),
            "x"
        );
        assert!(validate_required("name", Some("  ".into())).is_err());
        let err = validate_required("name", None).unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert_eq!(validate_quantity(Some(1)).unwrap(), 1);
        assert_eq!(validate_quantity(Some(101)).unwrap(), 101);
        assert_eq!(validate_quantity(Some(5000)).unwrap(), 5000);
        assert_eq!(validate_quantity(Some(u32::MAX.into())).unwrap(), u32::MAX);
        assert!(validate_quantity(Some(0)).is_err());
        assert!(validate_quantity(Some(-3)).is_err());
        assert!(validate_quantity(Some(i64::from(u32::MAX) + 1)).is_err());
        assert!(validate_quantity(None).is_err());
    }
}
