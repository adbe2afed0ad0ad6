#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid window: min_months ({min_months}) must not exceed max_months ({max_months})")]
    InvalidWindow { min_months: i32, max_months: i32 },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
