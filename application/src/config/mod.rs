//! Application-level configuration.
//!
//! - [`CouncilConfig`] - participants, aggregator and per-call deadline for one run

pub mod council_config;

pub use council_config::{CouncilConfig, DEFAULT_TIMEOUT};
