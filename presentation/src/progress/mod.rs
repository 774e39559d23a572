//! Progress reporting for council runs

pub mod reporter;
