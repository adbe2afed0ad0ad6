//! Default human-readable messages for violations.
//!
//! Kept apart from the evaluator so verdicts stay pure data; a rule's own
//! `message` replaces the rendered text without changing the reason code.

use super::rules::{Constraint, ViolationReason};

/// Render the default message for `field` failing `constraint` with `reason`.
pub fn render(field: &str, constraint: &Constraint, reason: ViolationReason) -> String {
    match (constraint, reason) {
        (_, ViolationReason::Missing) => format!("{field} is required"),
        (_, ViolationReason::NotADate) => format!("{field} must be a date"),
        (_, ViolationReason::NotAnInteger) => format!("{field} must be an integer"),
        (_, ViolationReason::NotAString) => format!("{field} must be a string"),
        (_, ViolationReason::NotANumber) => format!("{field} must be a number"),

        (Constraint::Length { min, .. }, ViolationReason::TooShort) => format!(
            "{field} must be at least {} characters long",
            min.unwrap_or_default()
        ),
        (Constraint::Length { max, .. }, ViolationReason::TooLong) => format!(
            "{field} must be at most {} characters long",
            max.unwrap_or_default()
        ),
        (Constraint::Contains { seed }, ViolationReason::MissingSeed) => {
            format!("{field} must contain a {seed} string")
        }
        (Constraint::MinValue { min }, ViolationReason::BelowMinimum) => {
            format!("{field} must not be less than {min}")
        }
        (Constraint::MaxValue { max }, ViolationReason::AboveMaximum) => {
            format!("{field} must not be greater than {max}")
        }
        (_, ViolationReason::InvalidEmail) => format!("{field} must be an email"),
        (_, ViolationReason::InvalidFqdn) => {
            format!("{field} must be a valid domain name")
        }

        (Constraint::BetweenMonths { window }, ViolationReason::OutOfWindow) => format!(
            "{field} must be within {} and {} months from today",
            window.min_months, window.max_months
        ),
        (Constraint::BetweenMonthsAndOtherIsAfter(c), ViolationReason::OutOfWindow) => format!(
            "{field} must be within {} and {} months from today",
            c.window.min_months, c.window.max_months
        ),
        (Constraint::BetweenMonthsAndOtherIsAfter(c), ViolationReason::OrderingViolation) => {
            format!("{} must not be before {field}", c.related_field)
        }
        (Constraint::BetweenMonthsAndOtherIsAfter(c), ViolationReason::SanityHorizonExceeded) => {
            format!(
                "{} must be within {} months from today",
                c.related_field, c.sanity_horizon_months
            )
        }
        (Constraint::BetweenMonthsAndOtherIsAfter(c), ViolationReason::RelatedMissing) => {
            format!("{} must be a date after {field}", c.related_field)
        }

        (constraint, reason) => format!(
            "{field} failed {} ({})",
            constraint.as_str(),
            reason.as_str()
        ),
    }
}
