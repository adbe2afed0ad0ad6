//! Rule table, constraint descriptors and result types.

use serde::{Deserialize, Serialize};

use crate::date_window::{DateViolation, RelatedDateConstraint, ValidationWindow};
use crate::error::CoreError;

/// A constraint attached to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Present, non-null, and not an empty string.
    Required,
    /// RFC 3339 timestamp or `YYYY-MM-DD` date string.
    IsDate,
    /// Integral JSON number.
    IsInt,
    /// String length in characters, both bounds inclusive.
    Length {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
    /// String contains `seed`.
    Contains { seed: String },
    MinValue { min: f64 },
    MaxValue { max: f64 },
    Email,
    /// Fully-qualified domain name.
    Fqdn,
    /// Date inside a rolling month window.
    BetweenMonths { window: ValidationWindow },
    /// Date inside a rolling window, with a related date after it.
    BetweenMonthsAndOtherIsAfter(RelatedDateConstraint),
}

impl Constraint {
    /// Stable string representation matching serde's `tag = "type"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::IsDate => "is_date",
            Self::IsInt => "is_int",
            Self::Length { .. } => "length",
            Self::Contains { .. } => "contains",
            Self::MinValue { .. } => "min_value",
            Self::MaxValue { .. } => "max_value",
            Self::Email => "email",
            Self::Fqdn => "fqdn",
            Self::BetweenMonths { .. } => "between_months",
            Self::BetweenMonthsAndOtherIsAfter(_) => "between_months_and_other_is_after",
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::BetweenMonths { window } => window.validate(),
            Self::BetweenMonthsAndOtherIsAfter(c) => {
                c.window.validate()?;
                if c.related_field.trim().is_empty() {
                    return Err(CoreError::InvalidRule(
                        "related_field must not be empty".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Length {
                min: Some(min),
                max: Some(max),
            } if min > max => Err(CoreError::InvalidRule(format!(
                "length min ({min}) must not exceed max ({max})"
            ))),
            Self::MinValue { min } if !min.is_finite() => Err(CoreError::InvalidRule(
                "min_value must be a finite number".to_string(),
            )),
            Self::MaxValue { max } if !max.is_finite() => Err(CoreError::InvalidRule(
                "max_value must be a finite number".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Whether a rule violation invalidates the record or is informational.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    #[default]
    Error,
    Warning,
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: String,
    pub constraint: Constraint,
    /// Overrides the rendered default message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: ValidationSeverity,
}

impl FieldRule {
    pub fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            constraint,
            message: None,
            severity: ValidationSeverity::Error,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn as_warning(mut self) -> Self {
        self.severity = ValidationSeverity::Warning;
        self
    }
}

/// Ordered list of field rules, checked for well-formedness on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<FieldRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, CoreError> {
        for rule in &rules {
            if rule.field.trim().is_empty() {
                return Err(CoreError::InvalidRule(format!(
                    "{} rule has an empty field name",
                    rule.constraint.as_str()
                )));
            }
            rule.constraint.validate().map_err(|e| match e {
                CoreError::InvalidRule(msg) => {
                    CoreError::InvalidRule(format!("{}: {msg}", rule.field))
                }
                other => other,
            })?;
        }
        Ok(Self { rules })
    }

    /// Parse a JSON array of [`FieldRule`]s.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let rules: Vec<FieldRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Rules attached to `field`, in table order.
    pub fn rules_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldRule> + 'a {
        self.rules.iter().filter(move |r| r.field == field)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'de> Deserialize<'de> for RuleTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rules = Vec::<FieldRule>::deserialize(deserializer)?;
        Self::new(rules).map_err(serde::de::Error::custom)
    }
}

/// Machine-readable reason for a field violation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    Missing,
    NotADate,
    NotAnInteger,
    NotAString,
    NotANumber,
    TooShort,
    TooLong,
    MissingSeed,
    BelowMinimum,
    AboveMaximum,
    InvalidEmail,
    InvalidFqdn,
    OutOfWindow,
    OrderingViolation,
    SanityHorizonExceeded,
    /// The related date field is absent or not a date.
    RelatedMissing,
}

impl ViolationReason {
    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NotADate => "not_a_date",
            Self::NotAnInteger => "not_an_integer",
            Self::NotAString => "not_a_string",
            Self::NotANumber => "not_a_number",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::MissingSeed => "missing_seed",
            Self::BelowMinimum => "below_minimum",
            Self::AboveMaximum => "above_maximum",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidFqdn => "invalid_fqdn",
            Self::OutOfWindow => "out_of_window",
            Self::OrderingViolation => "ordering_violation",
            Self::SanityHorizonExceeded => "sanity_horizon_exceeded",
            Self::RelatedMissing => "related_missing",
        }
    }
}

impl From<&DateViolation> for ViolationReason {
    fn from(v: &DateViolation) -> Self {
        match v {
            DateViolation::OutOfWindow { .. } => Self::OutOfWindow,
            DateViolation::OrderingViolation { .. } => Self::OrderingViolation,
            DateViolation::SanityHorizonExceeded { .. } => Self::SanityHorizonExceeded,
        }
    }
}

/// Aggregated result of evaluating all rules against one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
    pub warnings: Vec<FieldViolation>,
}

impl ValidationResult {
    /// Violations (errors and warnings) reported for `field`.
    pub fn violations_for<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = &'a FieldViolation> + 'a {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |v| v.field == field)
    }
}

/// A single field-level rule violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub constraint: String,
    pub reason: ViolationReason,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Date diagnostics for window and related-date failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DateViolation>,
}
