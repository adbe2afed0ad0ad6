//! `datewin-check` -- evaluate a JSON records file against a rule table.
//!
//! Prints the report as JSON on stdout. Exits `1` when any record is
//! invalid and `2` when configuration or input files are unusable.
//!
//! # Environment variables
//!
//! | Variable         | Required | Default | Description                                  |
//! |------------------|----------|---------|----------------------------------------------|
//! | `RULES_PATH`     | yes      | --      | JSON array of field rules                    |
//! | `RECORDS_PATH`   | yes      | --      | JSON array of record objects                 |
//! | `VALIDATION_NOW` | no       | now     | RFC 3339 instant to evaluate windows against |
//! | `MONTH_OVERFLOW` | no       | `clamp` | `clamp` or `rollover`                        |

use std::process::ExitCode;

use datewin_check::config::CheckConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_INVALID: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datewin_check=info,datewin_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match CheckConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let report = match datewin_check::run(&config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Check failed");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            return ExitCode::from(EXIT_ERROR);
        }
    }

    tracing::info!(
        total = report.total_records,
        valid = report.valid_records,
        "Check complete"
    );

    if report.all_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    }
}
