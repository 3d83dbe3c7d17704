//! Core types: records, protocol state, report layout and errors

pub mod constant;
pub mod error;
pub mod record;
pub mod report;
pub mod state;
