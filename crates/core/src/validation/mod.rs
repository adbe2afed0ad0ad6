//! Record validation engine.
//!
//! A [`rules::RuleTable`] maps field names to constraint descriptors; the
//! [`evaluator`] dispatches each descriptor against a record and collects
//! field-level violations. Message text is rendered separately in
//! [`message`].

pub mod evaluator;
pub mod message;
pub mod rules;
