//! `datewin-check` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod report;

pub use report::{run, CheckReport, RecordReport};
