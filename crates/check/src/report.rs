//! Batch evaluation of a records file against a rule table.

use std::path::Path;

use anyhow::{bail, Context};
use datewin_core::clock::{Clock, FixedClock};
use datewin_core::date_window::DateWindowValidator;
use datewin_core::types::Timestamp;
use datewin_core::validation::evaluator::evaluate_rules;
use datewin_core::validation::rules::{RuleTable, ValidationResult};
use serde::Serialize;
use serde_json::Value;

use crate::config::CheckConfig;

/// Outcome for one input record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub record_index: usize,
    pub result: ValidationResult,
}

/// Aggregated outcome for the whole records file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// The instant every record was judged against.
    pub now: Timestamp,
    pub total_records: usize,
    pub valid_records: usize,
    pub records: Vec<RecordReport>,
}

impl CheckReport {
    pub fn all_valid(&self) -> bool {
        self.valid_records == self.total_records
    }
}

/// Load the files named in `config` and evaluate every record.
pub fn run(config: &CheckConfig) -> anyhow::Result<CheckReport> {
    let table = load_rules(&config.rules_path)?;
    let records = load_records(&config.records_path)?;
    tracing::info!(
        rules = table.len(),
        records = records.len(),
        overflow = %config.overflow,
        "Loaded rule table and records"
    );

    let validator = DateWindowValidator::with_clock(config.clock()).with_overflow(config.overflow);
    check_records(&table, &records, &validator)
}

/// Evaluate `records` against `table`, pinning "now" for the whole batch.
pub fn check_records<C: Clock>(
    table: &RuleTable,
    records: &[Value],
    validator: &DateWindowValidator<C>,
) -> anyhow::Result<CheckReport> {
    // One instant for the batch, so records are judged consistently.
    let now = validator.now();
    let pinned = DateWindowValidator::with_clock(FixedClock(now))
        .with_overflow(validator.overflow());

    let mut reports = Vec::with_capacity(records.len());
    for (record_index, record) in records.iter().enumerate() {
        let Value::Object(map) = record else {
            bail!("record {record_index} is not a JSON object");
        };
        let result = evaluate_rules(table, map, &pinned);
        if !result.is_valid {
            tracing::info!(
                record_index,
                errors = result.errors.len(),
                "Record failed validation"
            );
        }
        reports.push(RecordReport {
            record_index,
            result,
        });
    }

    let valid_records = reports.iter().filter(|r| r.result.is_valid).count();
    Ok(CheckReport {
        now,
        total_records: reports.len(),
        valid_records,
        records: reports,
    })
}

fn load_rules(path: &Path) -> anyhow::Result<RuleTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule table {}", path.display()))?;
    RuleTable::from_json(&raw)
        .with_context(|| format!("Invalid rule table {}", path.display()))
}

fn load_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("Records file {} must be a JSON array", path.display()))?;
    Ok(records)
}
