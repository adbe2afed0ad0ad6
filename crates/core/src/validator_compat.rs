//! Adapters exposing the date rules to `#[derive(validator::Validate)]`.
//!
//! `custom(function = ...)` and `schema(function = ...)` expect functions
//! returning `Result<(), ValidationError>`. These wrap the window checks,
//! carrying the violation code and bounds through the error.
//!
//! ```ignore
//! #[derive(Validate)]
//! #[validate(schema(function = "check_expiration"))]
//! struct Policy {
//!     #[validate(custom(function = "within_a_year"))]
//!     effective_date: Timestamp,
//!     expiration_date: Timestamp,
//! }
//! ```

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use validator::ValidationError;

use crate::clock::{Clock, SystemClock};
use crate::date_window::{
    DateViolation, DateWindowValidator, RelatedDateConstraint, ValidationWindow,
};
use crate::types::Timestamp;

/// Longest allowed domain name, in bytes.
const FQDN_MAX_LEN: usize = 253;

impl From<DateViolation> for ValidationError {
    fn from(v: DateViolation) -> Self {
        let mut err = ValidationError::new(v.code());
        match v {
            DateViolation::OutOfWindow { lower, upper } => {
                err.add_param(Cow::from("lower"), &lower);
                err.add_param(Cow::from("upper"), &upper);
                err.message = Some(Cow::from(format!(
                    "must be between {} and {}",
                    lower.to_rfc3339(),
                    upper.to_rfc3339()
                )));
            }
            DateViolation::OrderingViolation { primary, related } => {
                err.add_param(Cow::from("primary"), &primary);
                err.add_param(Cow::from("related"), &related);
                err.message = Some(Cow::from("related date must not be before this date"));
            }
            DateViolation::SanityHorizonExceeded { horizon } => {
                err.add_param(Cow::from("horizon"), &horizon);
                err.message = Some(Cow::from(format!(
                    "related date must not be after {}",
                    horizon.to_rfc3339()
                )));
            }
        }
        err
    }
}

/// Window check against the system clock.
pub fn between_months(value: &Timestamp, window: ValidationWindow) -> Result<(), ValidationError> {
    between_months_with(value, window, &DateWindowValidator::<SystemClock>::system())
}

/// Window check against an explicit validator.
pub fn between_months_with<C: Clock>(
    value: &Timestamp,
    window: ValidationWindow,
    validator: &DateWindowValidator<C>,
) -> Result<(), ValidationError> {
    validator
        .check_month_window(*value, &window)
        .map_err(ValidationError::from)
}

/// Related-date check against the system clock.
pub fn between_months_and_other_is_after(
    primary: &Timestamp,
    related: &Timestamp,
    constraint: &RelatedDateConstraint,
) -> Result<(), ValidationError> {
    between_months_and_other_is_after_with(
        primary,
        related,
        constraint,
        &DateWindowValidator::<SystemClock>::system(),
    )
}

/// Related-date check against an explicit validator.
pub fn between_months_and_other_is_after_with<C: Clock>(
    primary: &Timestamp,
    related: &Timestamp,
    constraint: &RelatedDateConstraint,
    validator: &DateWindowValidator<C>,
) -> Result<(), ValidationError> {
    validator
        .check_related_window(*primary, *related, constraint)
        .map_err(ValidationError::from)
}

/// `custom` validator for fully-qualified domain names.
pub fn fqdn<T: AsRef<str> + ?Sized>(value: &T) -> Result<(), ValidationError> {
    if is_fqdn(value.as_ref()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_fqdn");
        err.message = Some(Cow::from("must be a fully-qualified domain name"));
        Err(err)
    }
}

/// At least two labels, alphanumeric or inner hyphens, alphabetic TLD.
/// A single trailing dot is accepted.
pub fn is_fqdn(value: &str) -> bool {
    static LABEL: OnceLock<Option<Regex>> = OnceLock::new();
    static TLD: OnceLock<Option<Regex>> = OnceLock::new();

    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > FQDN_MAX_LEN {
        return false;
    }

    let (Some(label_re), Some(tld_re)) = (
        LABEL
            .get_or_init(|| Regex::new(r"^(?i)[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").ok())
            .as_ref(),
        TLD.get_or_init(|| Regex::new(r"^(?i)(?:[a-z]{2,63}|xn--[a-z0-9-]{2,59})$").ok())
            .as_ref(),
    ) else {
        return false;
    };

    let labels: Vec<&str> = name.split('.').collect();
    match labels.split_last() {
        Some((tld, rest)) if !rest.is_empty() => {
            tld_re.is_match(tld) && rest.iter().all(|l| label_re.is_match(l))
        }
        _ => false,
    }
}
