//! Rule evaluator -- pure logic, no I/O.
//!
//! "Now" is read from the validator's clock once per record, so every rule
//! on that record is judged against the same instant.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use validator::ValidateEmail;

use super::message;
use super::rules::{
    Constraint, FieldRule, FieldViolation, RuleTable, ValidationResult, ValidationSeverity,
    ViolationReason,
};
use crate::clock::Clock;
use crate::date_window::{
    check_month_window_at, check_related_window_at, DateViolation, DateWindowValidator,
};
use crate::error::CoreError;
use crate::months::MonthOverflow;
use crate::types::Timestamp;
use crate::validator_compat::is_fqdn;

/// Evaluate every rule in `table` against a single data record.
pub fn evaluate_rules<C: Clock>(
    table: &RuleTable,
    data: &serde_json::Map<String, Value>,
    validator: &DateWindowValidator<C>,
) -> ValidationResult {
    let ctx = EvalContext {
        data,
        now: validator.now(),
        overflow: validator.overflow(),
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for rule in table.rules() {
        if let Some(violation) = evaluate_single_rule(rule, &ctx) {
            tracing::debug!(
                field = %violation.field,
                constraint = %violation.constraint,
                reason = violation.reason.as_str(),
                "Field violation"
            );
            match rule.severity {
                ValidationSeverity::Error => errors.push(violation),
                ValidationSeverity::Warning => warnings.push(violation),
            }
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Serialize `record` and evaluate it.
///
/// Plain structs work directly: chrono timestamps serialize as RFC 3339
/// strings, which the date constraints parse back.
pub fn validate_record<T, C>(
    table: &RuleTable,
    record: &T,
    validator: &DateWindowValidator<C>,
) -> Result<ValidationResult, CoreError>
where
    T: Serialize + ?Sized,
    C: Clock,
{
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(evaluate_rules(table, &map, validator)),
        other => Err(CoreError::Validation(format!(
            "record must serialize to a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a JSON value as a date: RFC 3339, or `YYYY-MM-DD` at midnight UTC.
pub fn parse_date(value: &Value) -> Option<Timestamp> {
    let s = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

struct EvalContext<'a> {
    data: &'a serde_json::Map<String, Value>,
    now: Timestamp,
    overflow: MonthOverflow,
}

struct Failure {
    reason: ViolationReason,
    detail: Option<DateViolation>,
}

impl From<ViolationReason> for Failure {
    fn from(reason: ViolationReason) -> Self {
        Self {
            reason,
            detail: None,
        }
    }
}

impl From<DateViolation> for Failure {
    fn from(v: DateViolation) -> Self {
        Self {
            reason: ViolationReason::from(&v),
            detail: Some(v),
        }
    }
}

fn evaluate_single_rule(rule: &FieldRule, ctx: &EvalContext<'_>) -> Option<FieldViolation> {
    let field_value = ctx.data.get(&rule.field);

    // Everything except `required` leaves presence to `required`.
    let value = match (&rule.constraint, field_value) {
        (Constraint::Required, _) => {
            return evaluate_required(field_value).map(|f| violation(rule, field_value, f));
        }
        (_, None | Some(Value::Null)) => return None,
        (_, Some(v)) => v,
    };

    let outcome: Result<(), Failure> = match &rule.constraint {
        Constraint::Required => Ok(()),
        Constraint::IsDate => parse_date(value)
            .map(|_| ())
            .ok_or(ViolationReason::NotADate.into()),
        Constraint::IsInt => evaluate_is_int(value),
        Constraint::Length { min, max } => evaluate_length(value, *min, *max),
        Constraint::Contains { seed } => evaluate_contains(value, seed),
        Constraint::MinValue { min } => {
            evaluate_number(value, |n| n >= *min, ViolationReason::BelowMinimum)
        }
        Constraint::MaxValue { max } => {
            evaluate_number(value, |n| n <= *max, ViolationReason::AboveMaximum)
        }
        Constraint::Email => evaluate_string(
            value,
            |s| s.to_string().validate_email(),
            ViolationReason::InvalidEmail,
        ),
        Constraint::Fqdn => evaluate_string(value, is_fqdn, ViolationReason::InvalidFqdn),
        Constraint::BetweenMonths { window } => parse_date(value)
            .ok_or(Failure::from(ViolationReason::NotADate))
            .and_then(|candidate| {
                check_month_window_at(candidate, window, ctx.now, ctx.overflow)
                    .map_err(Failure::from)
            }),
        Constraint::BetweenMonthsAndOtherIsAfter(c) => match parse_date(value) {
            None => Err(ViolationReason::NotADate.into()),
            Some(primary) => match ctx.data.get(&c.related_field).and_then(parse_date) {
                // A missing related date only matters once the primary
                // date itself is inside its window.
                None => check_month_window_at(primary, &c.window, ctx.now, ctx.overflow)
                    .map_err(Failure::from)
                    .and(Err(ViolationReason::RelatedMissing.into())),
                Some(related) => {
                    check_related_window_at(primary, related, c, ctx.now, ctx.overflow)
                        .map_err(Failure::from)
                }
            },
        },
    };

    outcome.err().map(|f| violation(rule, Some(value), f))
}

fn violation(rule: &FieldRule, value: Option<&Value>, failure: Failure) -> FieldViolation {
    FieldViolation {
        field: rule.field.clone(),
        constraint: rule.constraint.as_str().to_string(),
        reason: failure.reason,
        message: rule
            .message
            .clone()
            .unwrap_or_else(|| message::render(&rule.field, &rule.constraint, failure.reason)),
        value: value.cloned(),
        detail: failure.detail,
    }
}

fn evaluate_required(value: Option<&Value>) -> Option<Failure> {
    match value {
        None | Some(Value::Null) => Some(ViolationReason::Missing.into()),
        Some(Value::String(s)) if s.is_empty() => Some(ViolationReason::Missing.into()),
        _ => None,
    }
}

fn evaluate_is_int(value: &Value) -> Result<(), Failure> {
    let is_int = match value {
        Value::Number(n) => {
            n.is_i64()
                || n.is_u64()
                || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    };
    if is_int {
        Ok(())
    } else {
        Err(ViolationReason::NotAnInteger.into())
    }
}

fn evaluate_length(value: &Value, min: Option<u64>, max: Option<u64>) -> Result<(), Failure> {
    let s = value.as_str().ok_or(Failure::from(ViolationReason::NotAString))?;
    let len = s.chars().count() as u64;
    if min.is_some_and(|min| len < min) {
        return Err(ViolationReason::TooShort.into());
    }
    if max.is_some_and(|max| len > max) {
        return Err(ViolationReason::TooLong.into());
    }
    Ok(())
}

fn evaluate_contains(value: &Value, seed: &str) -> Result<(), Failure> {
    let s = value.as_str().ok_or(Failure::from(ViolationReason::NotAString))?;
    if s.contains(seed) {
        Ok(())
    } else {
        Err(ViolationReason::MissingSeed.into())
    }
}

fn evaluate_number(
    value: &Value,
    accept: impl Fn(f64) -> bool,
    reason: ViolationReason,
) -> Result<(), Failure> {
    let n = value
        .as_f64()
        .ok_or(Failure::from(ViolationReason::NotANumber))?;
    if accept(n) {
        Ok(())
    } else {
        Err(reason.into())
    }
}

fn evaluate_string(
    value: &Value,
    accept: impl Fn(&str) -> bool,
    reason: ViolationReason,
) -> Result<(), Failure> {
    let s = value.as_str().ok_or(Failure::from(ViolationReason::NotAString))?;
    if accept(s) {
        Ok(())
    } else {
        Err(reason.into())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
