//! End-to-end runs of the checker over rule and record files on disk.

use std::io::Write;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use datewin_check::config::CheckConfig;
use datewin_check::run;
use datewin_core::months::MonthOverflow;
use datewin_core::validation::rules::ViolationReason;
use serde_json::json;
use tempfile::NamedTempFile;

fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{value}").expect("write temp file");
    file
}

fn smart_rules() -> serde_json::Value {
    json!([
        {"field": "effective_date", "constraint": {"type": "required"}},
        {"field": "effective_date", "constraint": {"type": "is_date"}},
        {
            "field": "effective_date",
            "constraint": {
                "type": "between_months_and_other_is_after",
                "window": {"min_months": -12, "max_months": 12},
                "related_field": "expiration_date"
            }
        },
        {"field": "expiration_date", "constraint": {"type": "is_date"}}
    ])
}

fn config(rules: &NamedTempFile, records: &NamedTempFile) -> CheckConfig {
    CheckConfig {
        rules_path: rules.path().to_path_buf(),
        records_path: records.path().to_path_buf(),
        now: Some(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()),
        overflow: MonthOverflow::Clamp,
    }
}

#[test]
fn reports_each_failure_reason() {
    let rules = write_json(&smart_rules());
    let records = write_json(&json!([
        // valid: +9 months, expires 6 months later
        {"effective_date": "2027-07-19T12:00:00Z", "expiration_date": "2028-01-19T12:00:00Z"},
        // out of window: +19 months
        {"effective_date": "2028-05-19T12:00:00Z", "expiration_date": "2028-11-19T12:00:00Z"},
        // ordering: expires before it takes effect
        {"effective_date": "2027-07-19T12:00:00Z", "expiration_date": "2027-01-19T12:00:00Z"},
        // horizon: expires a thousand years out
        {"effective_date": "2027-07-19T12:00:00Z", "expiration_date": "3027-07-19T12:00:00Z"},
        // missing primary
        {"expiration_date": "2028-01-19T12:00:00Z"}
    ]));

    let report = run(&config(&rules, &records)).unwrap();
    assert_eq!(report.total_records, 5);
    assert_eq!(report.valid_records, 1);

    let reasons: Vec<ViolationReason> = report.records[1..]
        .iter()
        .map(|r| r.result.errors[0].reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            ViolationReason::OutOfWindow,
            ViolationReason::OrderingViolation,
            ViolationReason::SanityHorizonExceeded,
            ViolationReason::Missing,
        ]
    );
}

#[test]
fn report_serializes_reason_codes() {
    let rules = write_json(&smart_rules());
    let records = write_json(&json!([
        {"effective_date": "2027-07-19T12:00:00Z", "expiration_date": "2027-01-19T12:00:00Z"}
    ]));

    let report = run(&config(&rules, &records)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let error = &json["records"][0]["result"]["errors"][0];
    assert_eq!(error["reason"], "ordering_violation");
    assert_eq!(error["constraint"], "between_months_and_other_is_after");
    assert_eq!(error["detail"]["kind"], "ordering_violation");
    assert_eq!(json["now"], "2026-10-19T12:00:00Z");
}

#[test]
fn invalid_rule_table_is_an_error() {
    let rules = write_json(&json!([{
        "field": "effective_date",
        "constraint": {"type": "between_months", "window": {"min_months": 12, "max_months": -12}}
    }]));
    let records = write_json(&json!([]));

    let err = run(&config(&rules, &records)).unwrap_err();
    assert!(format!("{err:#}").contains("min_months (12) must not exceed max_months (-12)"));
}

#[test]
fn missing_records_file_is_an_error() {
    let rules = write_json(&smart_rules());
    let records = write_json(&json!([]));
    let mut cfg = config(&rules, &records);
    cfg.records_path = PathBuf::from("/nonexistent/datewin/records.json");

    let err = run(&cfg).unwrap_err();
    assert!(err.to_string().contains("Failed to read records"));
}

#[test]
fn records_file_must_be_an_array() {
    let rules = write_json(&smart_rules());
    let records = write_json(&json!({"effective_date": "2027-07-19"}));

    let err = run(&config(&rules, &records)).unwrap_err();
    assert!(err.to_string().contains("must be a JSON array"));
}
