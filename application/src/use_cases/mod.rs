//! Use cases
//!
//! - [`fan_out`] - concurrent per-call execution with index-addressed results
//! - [`run_council`] - the three-stage council pipeline

pub mod fan_out;
pub mod run_council;
