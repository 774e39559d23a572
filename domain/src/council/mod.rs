//! Council domain
//!
//! Stages, the pipeline state machine, per-stage result records, and the
//! pure logic of the review stage (anonymization and rank extraction).

pub mod anonymizer;
pub mod entities;
pub mod ranking;
pub mod value_objects;
