//! Calendar-month arithmetic with an explicit month-end policy.
//!
//! Adding months is not the same as adding a fixed number of days: the
//! target month may be shorter than the source day allows (Jan 31 + 1 month).
//! [`MonthOverflow`] decides what happens to the surplus days.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// How a day that does not exist in the target month is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthOverflow {
    /// Clamp to the last day of the target month (Jan 31 + 1 = Feb 28/29).
    #[default]
    Clamp,
    /// Spill surplus days into the next month (Jan 31 + 1 = Mar 3/2).
    Rollover,
}

impl MonthOverflow {
    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Rollover => "rollover",
        }
    }
}

impl fmt::Display for MonthOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonthOverflow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "rollover" => Ok(Self::Rollover),
            other => Err(CoreError::Parse(format!(
                "unknown month overflow policy '{other}' (expected 'clamp' or 'rollover')"
            ))),
        }
    }
}

/// Shift `ts` by `months` calendar months (negative moves backwards).
///
/// Time of day is preserved. Returns `None` when the result leaves the
/// range chrono can represent.
pub fn add_months(ts: Timestamp, months: i32, overflow: MonthOverflow) -> Option<Timestamp> {
    match overflow {
        MonthOverflow::Clamp => add_months_clamped(ts, months),
        MonthOverflow::Rollover => add_months_rollover(ts, months),
    }
}

/// Like [`add_months`] but saturates at the representable range instead of
/// failing. Window bounds use this so extreme offsets still compare sanely.
pub fn add_months_saturating(ts: Timestamp, months: i32, overflow: MonthOverflow) -> Timestamp {
    add_months(ts, months, overflow).unwrap_or(if months < 0 {
        Timestamp::MIN_UTC
    } else {
        Timestamp::MAX_UTC
    })
}

fn add_months_clamped(ts: Timestamp, months: i32) -> Option<Timestamp> {
    let delta = Months::new(months.unsigned_abs());
    if months >= 0 {
        ts.checked_add_months(delta)
    } else {
        ts.checked_sub_months(delta)
    }
}

fn add_months_rollover(ts: Timestamp, months: i32) -> Option<Timestamp> {
    let naive = ts.naive_utc();
    let total = i64::from(naive.year()) * 12 + i64::from(naive.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first_of_month.checked_add_days(Days::new(u64::from(naive.day() - 1)))?;
    Some(Utc.from_utc_datetime(&date.and_time(naive.time())))
}
