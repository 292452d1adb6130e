//! Field-level validation errors and shared checks.

use super::{Kind, RecordId, Sex};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Phone column width in the schema.
pub const PHONE_MAX_CHARS: usize = 15;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+()\- ]+$").expect("valid phone regex"));

/// Violation of a record invariant detected before touching storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField { kind: Kind, field: &'static str },
    /// Numeric field must be strictly positive.
    NotPositive {
        kind: Kind,
        field: &'static str,
        value: f64,
    },
    /// Numeric field must not be negative.
    Negative {
        kind: Kind,
        field: &'static str,
        value: f64,
    },
    /// Numeric field is NaN or infinite.
    NotFinite { kind: Kind, field: &'static str },
    /// Sex text outside `Male`/`Female`.
    InvalidSex(String),
    /// A date precedes another date it must not precede.
    DateOrder {
        kind: Kind,
        earlier: &'static str,
        later: &'static str,
    },
    /// Phone contains unsupported characters or is too long.
    InvalidPhone(String),
    /// Storage-level `CHECK` constraint rejected the row.
    Constraint(String),
    /// Referenced parent animal has the wrong sex.
    ParentSexMismatch {
        column: &'static str,
        animal_id: RecordId,
        expected: Sex,
        actual: Sex,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { kind, field } => write!(f, "{kind}.{field} must not be blank"),
            Self::NotPositive { kind, field, value } => {
                write!(f, "{kind}.{field} must be greater than zero, got {value}")
            }
            Self::Negative { kind, field, value } => {
                write!(f, "{kind}.{field} must not be negative, got {value}")
            }
            Self::NotFinite { kind, field } => write!(f, "{kind}.{field} must be a finite number"),
            Self::InvalidSex(value) => {
                write!(f, "invalid sex `{value}`; expected Male|Female")
            }
            Self::DateOrder {
                kind,
                earlier,
                later,
            } => write!(f, "{kind}.{later} must not be earlier than {kind}.{earlier}"),
            Self::InvalidPhone(value) => write!(
                f,
                "invalid phone `{value}`; expected at most {PHONE_MAX_CHARS} digits, spaces or +-()"
            ),
            Self::Constraint(message) => write!(f, "constraint check failed: {message}"),
            Self::ParentSexMismatch {
                column,
                animal_id,
                expected,
                actual,
            } => write!(
                f,
                "{column} must reference a {expected} animal; animal {animal_id} is {actual}"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    kind: Kind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { kind, field });
    }
    Ok(())
}

pub(crate) fn require_positive(
    kind: Kind,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { kind, field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { kind, field, value });
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    kind: Kind,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { kind, field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { kind, field, value });
    }
    Ok(())
}

/// Empty phone is allowed; the field is optional.
pub(crate) fn check_phone(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.chars().count() > PHONE_MAX_CHARS || !PHONE_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidPhone(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_phone, require_non_negative, require_positive, ValidationError};
    use crate::model::Kind;

    #[test]
    fn phone_accepts_common_formats() {
        check_phone("").unwrap();
        check_phone("+7 (495) 123-45").unwrap();
    }

    #[test]
    fn phone_rejects_letters_and_overlong_values() {
        assert!(matches!(
            check_phone("call me"),
            Err(ValidationError::InvalidPhone(_))
        ));
        assert!(check_phone("1234567890123456").is_err());
    }

    #[test]
    fn numeric_checks_reject_nan_and_bounds() {
        assert!(matches!(
            require_positive(Kind::Enclosure, "size", f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(require_positive(Kind::Enclosure, "size", 0.0).is_err());
        require_non_negative(Kind::AnimalFeed, "daily_amount", 0.0).unwrap();
        assert!(require_non_negative(Kind::AnimalFeed, "daily_amount", -0.5).is_err());
    }
}
