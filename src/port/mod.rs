//! Boundaries the pipeline depends on

pub mod sink;
pub mod transform;
