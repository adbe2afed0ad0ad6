/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Default sanity horizon for related dates: 100 years.
pub const DEFAULT_SANITY_HORIZON_MONTHS: i32 = 1200;
