//! `datewin-core` -- month-window date rules.
//!
//! Pure logic with no I/O: calendar-month arithmetic, an injectable clock,
//! the [`DateWindowValidator`](date_window::DateWindowValidator), and a rule
//! table evaluator that applies date and built-in constraints to records.

pub mod clock;
pub mod date_window;
pub mod error;
pub mod months;
pub mod types;
pub mod validation;
pub mod validator_compat;
