//! Rolling month-window checks for single dates and related date pairs.
//!
//! The `*_at` functions are pure: they take "now" as an argument. The
//! [`DateWindowValidator`] wraps them with an injected [`Clock`] and a
//! [`MonthOverflow`] policy.

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::months::{add_months_saturating, MonthOverflow};
use crate::types::{Timestamp, DEFAULT_SANITY_HORIZON_MONTHS};

// ---------------------------------------------------------------------------
// Constraint types
// ---------------------------------------------------------------------------

/// Inclusive window `[now + min_months, now + max_months]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWindow {
    pub min_months: i32,
    pub max_months: i32,
}

impl ValidationWindow {
    /// Build a window, rejecting `min_months > max_months`.
    pub fn new(min_months: i32, max_months: i32) -> Result<Self, CoreError> {
        let window = Self {
            min_months,
            max_months,
        };
        window.validate()?;
        Ok(window)
    }

    /// Check the `min_months <= max_months` invariant.
    ///
    /// Windows deserialized from a rule table bypass [`ValidationWindow::new`],
    /// so rule-table loading calls this explicitly.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_months > self.max_months {
            return Err(CoreError::InvalidWindow {
                min_months: self.min_months,
                max_months: self.max_months,
            });
        }
        Ok(())
    }

    /// Resolve the window against `now`.
    pub fn bounds_at(
        &self,
        now: Timestamp,
        overflow: MonthOverflow,
    ) -> (Timestamp, Timestamp) {
        (
            add_months_saturating(now, self.min_months, overflow),
            add_months_saturating(now, self.max_months, overflow),
        )
    }
}

fn default_sanity_horizon_months() -> i32 {
    DEFAULT_SANITY_HORIZON_MONTHS
}

/// Window on a primary date plus ordering and horizon checks on a related one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDateConstraint {
    pub window: ValidationWindow,
    /// Field holding the related date (e.g. `expiration_date`).
    pub related_field: String,
    /// Latest acceptable related date, in months from now.
    #[serde(default = "default_sanity_horizon_months")]
    pub sanity_horizon_months: i32,
}

impl RelatedDateConstraint {
    /// Constraint with the default 100-year sanity horizon.
    pub fn new(window: ValidationWindow, related_field: impl Into<String>) -> Self {
        Self {
            window,
            related_field: related_field.into(),
            sanity_horizon_months: DEFAULT_SANITY_HORIZON_MONTHS,
        }
    }

    pub fn with_sanity_horizon(mut self, months: i32) -> Self {
        self.sanity_horizon_months = months;
        self
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// Why a date check failed. Reported as data, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateViolation {
    /// The candidate lies outside `[lower, upper]`.
    OutOfWindow { lower: Timestamp, upper: Timestamp },
    /// The related date precedes the primary date.
    OrderingViolation {
        primary: Timestamp,
        related: Timestamp,
    },
    /// The related date lies beyond the sanity horizon.
    SanityHorizonExceeded { horizon: Timestamp },
}

impl DateViolation {
    /// Stable machine code for the violation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfWindow { .. } => "out_of_window",
            Self::OrderingViolation { .. } => "ordering_violation",
            Self::SanityHorizonExceeded { .. } => "sanity_horizon_exceeded",
        }
    }
}

// ---------------------------------------------------------------------------
// Pure checks
// ---------------------------------------------------------------------------

/// Check that `candidate` lies inside `window` as seen from `now`.
pub fn check_month_window_at(
    candidate: Timestamp,
    window: &ValidationWindow,
    now: Timestamp,
    overflow: MonthOverflow,
) -> Result<(), DateViolation> {
    let (lower, upper) = window.bounds_at(now, overflow);
    if candidate < lower || candidate > upper {
        return Err(DateViolation::OutOfWindow { lower, upper });
    }
    Ok(())
}

/// Check the primary window, then ordering and sanity horizon of `related`.
///
/// The related date is not inspected when the primary date is out of its
/// window.
pub fn check_related_window_at(
    primary: Timestamp,
    related: Timestamp,
    constraint: &RelatedDateConstraint,
    now: Timestamp,
    overflow: MonthOverflow,
) -> Result<(), DateViolation> {
    check_month_window_at(primary, &constraint.window, now, overflow)?;

    if related < primary {
        return Err(DateViolation::OrderingViolation { primary, related });
    }

    let horizon = add_months_saturating(now, constraint.sanity_horizon_months, overflow);
    if related > horizon {
        return Err(DateViolation::SanityHorizonExceeded { horizon });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Evaluates window rules against an injected clock.
#[derive(Debug, Clone)]
pub struct DateWindowValidator<C = SystemClock> {
    clock: C,
    overflow: MonthOverflow,
}

impl DateWindowValidator<SystemClock> {
    /// Validator reading the system clock, with [`MonthOverflow::Clamp`].
    pub fn system() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for DateWindowValidator<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

impl<C: Clock> DateWindowValidator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            overflow: MonthOverflow::default(),
        }
    }

    pub fn with_overflow(mut self, overflow: MonthOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn overflow(&self) -> MonthOverflow {
        self.overflow
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// `true` iff `now + min_months <= candidate <= now + max_months`.
    pub fn within_month_window(&self, candidate: Timestamp, window: &ValidationWindow) -> bool {
        self.check_month_window(candidate, window).is_ok()
    }

    pub fn check_month_window(
        &self,
        candidate: Timestamp,
        window: &ValidationWindow,
    ) -> Result<(), DateViolation> {
        check_month_window_at(candidate, window, self.now(), self.overflow)
    }

    /// `true` iff `primary` is inside the window and
    /// `primary <= related <= now + sanity_horizon_months`.
    pub fn within_related_window(
        &self,
        primary: Timestamp,
        related: Timestamp,
        constraint: &RelatedDateConstraint,
    ) -> bool {
        self.check_related_window(primary, related, constraint)
            .is_ok()
    }

    pub fn check_related_window(
        &self,
        primary: Timestamp,
        related: Timestamp,
        constraint: &RelatedDateConstraint,
    ) -> Result<(), DateViolation> {
        check_related_window_at(primary, related, constraint, self.now(), self.overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::months::add_months;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn t() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn shift(ts: Timestamp, months: i32) -> Timestamp {
        add_months(ts, months, MonthOverflow::Clamp).unwrap()
    }

    fn validator() -> DateWindowValidator<FixedClock> {
        DateWindowValidator::with_clock(FixedClock(t()))
    }

    fn year() -> ValidationWindow {
        ValidationWindow::new(-12, 12).unwrap()
    }

    // -----------------------------------------------------------------------
    // Window construction
    // -----------------------------------------------------------------------

    #[test]
    fn window_rejects_inverted_bounds() {
        assert_matches!(
            ValidationWindow::new(6, -6),
            Err(CoreError::InvalidWindow {
                min_months: 6,
                max_months: -6
            })
        );
    }

    #[test]
    fn window_accepts_single_point() {
        assert!(ValidationWindow::new(3, 3).is_ok());
    }

    #[test]
    fn related_constraint_defaults_to_hundred_years() {
        let c = RelatedDateConstraint::new(year(), "expiration_date");
        assert_eq!(c.sanity_horizon_months, 1200);
    }

    // -----------------------------------------------------------------------
    // Scenarios A / B
    // -----------------------------------------------------------------------

    #[test]
    fn nine_months_ahead_is_inside_year_window() {
        assert!(validator().within_month_window(shift(t(), 9), &year()));
    }

    #[test]
    fn nineteen_months_ahead_is_outside_year_window() {
        let v = validator();
        assert!(!v.within_month_window(shift(t(), 19), &year()));
        assert_matches!(
            v.check_month_window(shift(t(), 19), &year()),
            Err(DateViolation::OutOfWindow { lower, upper })
                if lower == shift(t(), -12) && upper == shift(t(), 12)
        );
    }

    #[test]
    fn nine_months_ago_is_inside_year_window() {
        assert!(validator().within_month_window(shift(t(), -9), &year()));
    }

    #[test]
    fn nineteen_months_ago_is_outside_year_window() {
        assert!(!validator().within_month_window(shift(t(), -19), &year()));
    }

    // -----------------------------------------------------------------------
    // Window properties
    // -----------------------------------------------------------------------

    #[test]
    fn now_is_inside_any_window_straddling_zero() {
        let v = validator();
        for min in -24..=0 {
            for max in 0..=24 {
                let w = ValidationWindow::new(min, max).unwrap();
                assert!(v.within_month_window(t(), &w), "[{min}, {max}]");
            }
        }
    }

    #[test]
    fn widening_a_window_keeps_candidates_valid() {
        let v = validator();
        for offset in -6..=6 {
            let candidate = shift(t(), offset);
            let narrow = ValidationWindow::new(-6, 6).unwrap();
            assert!(v.within_month_window(candidate, &narrow));
            for extra in 1..=12 {
                let wide = ValidationWindow::new(-6 - extra, 6 + extra).unwrap();
                assert!(v.within_month_window(candidate, &wide), "offset {offset}");
            }
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let v = validator();
        let w = year();
        assert!(v.within_month_window(shift(t(), -12), &w));
        assert!(v.within_month_window(shift(t(), 12), &w));
        assert!(!v.within_month_window(shift(t(), 12) + Duration::seconds(1), &w));
        assert!(!v.within_month_window(shift(t(), -12) - Duration::seconds(1), &w));
    }

    #[test]
    fn window_entirely_in_the_past() {
        let v = validator();
        let w = ValidationWindow::new(-24, -12).unwrap();
        assert!(v.within_month_window(shift(t(), -18), &w));
        assert!(!v.within_month_window(t(), &w));
    }

    #[test]
    fn result_depends_on_the_clock() {
        let candidate = shift(t(), 9);
        let today = DateWindowValidator::with_clock(FixedClock(t()));
        let later = DateWindowValidator::with_clock(FixedClock(shift(t(), 22)));
        assert!(today.within_month_window(candidate, &year()));
        assert!(!later.within_month_window(candidate, &year()));
    }

    #[test]
    fn month_end_policy_moves_the_upper_bound() {
        // now = Jan 31: +1 month is Feb 28 (clamp) or Mar 3 (rollover).
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let w = ValidationWindow::new(0, 1).unwrap();
        let mar_1 = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        let clamp = DateWindowValidator::with_clock(FixedClock(now));
        let rollover = clamp.clone().with_overflow(MonthOverflow::Rollover);

        assert!(!clamp.within_month_window(mar_1, &w));
        assert!(rollover.within_month_window(mar_1, &w));
    }

    #[test]
    fn extreme_offsets_saturate() {
        let v = validator();
        let w = ValidationWindow::new(i32::MIN, i32::MAX).unwrap();
        assert!(v.within_month_window(Timestamp::MIN_UTC, &w));
        assert!(v.within_month_window(Timestamp::MAX_UTC, &w));
    }

    // -----------------------------------------------------------------------
    // Related window: scenarios C / D / E
    // -----------------------------------------------------------------------

    fn smart() -> RelatedDateConstraint {
        RelatedDateConstraint::new(year(), "expiration_date")
    }

    #[test]
    fn related_six_months_after_is_valid() {
        let primary = shift(t(), 9);
        let related = shift(primary, 6);
        assert!(validator().within_related_window(primary, related, &smart()));
    }

    #[test]
    fn related_before_primary_is_ordering_violation() {
        let primary = shift(t(), 9);
        let related = shift(primary, -6);
        assert_matches!(
            validator().check_related_window(primary, related, &smart()),
            Err(DateViolation::OrderingViolation { .. })
        );
    }

    #[test]
    fn related_thousand_years_out_exceeds_horizon() {
        let primary = shift(t(), 9);
        let related = shift(primary, 12_000);
        assert_matches!(
            validator().check_related_window(primary, related, &smart()),
            Err(DateViolation::SanityHorizonExceeded { horizon }) if horizon == shift(t(), 1200)
        );
    }

    #[test]
    fn related_equal_to_primary_is_valid() {
        let primary = shift(t(), 3);
        assert!(validator().within_related_window(primary, primary, &smart()));
    }

    #[test]
    fn related_on_horizon_is_valid() {
        let primary = shift(t(), 3);
        let c = smart().with_sanity_horizon(24);
        assert!(validator().within_related_window(primary, shift(t(), 24), &c));
        assert!(!validator().within_related_window(
            primary,
            shift(t(), 24) + Duration::seconds(1),
            &c
        ));
    }

    #[test]
    fn primary_out_of_window_short_circuits() {
        // The related date would also violate ordering, but the window
        // failure is what gets reported.
        let primary = shift(t(), 19);
        let related = shift(primary, -6);
        assert_matches!(
            validator().check_related_window(primary, related, &smart()),
            Err(DateViolation::OutOfWindow { .. })
        );
    }

    #[test]
    fn ordering_fails_regardless_of_window() {
        let v = validator();
        for offset in -12..=12 {
            let primary = shift(t(), offset);
            let related = primary - Duration::days(1);
            assert!(!v.within_related_window(primary, related, &smart()));
        }
    }

    #[test]
    fn violation_codes_are_stable() {
        let now = t();
        assert_eq!(
            DateViolation::OutOfWindow {
                lower: now,
                upper: now
            }
            .code(),
            "out_of_window"
        );
        assert_eq!(
            DateViolation::OrderingViolation {
                primary: now,
                related: now
            }
            .code(),
            "ordering_violation"
        );
        assert_eq!(
            DateViolation::SanityHorizonExceeded { horizon: now }.code(),
            "sanity_horizon_exceeded"
        );
    }
}
