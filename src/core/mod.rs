//! Core types: errors, configuration, timestamp formatting.

pub mod config;
pub mod errors;
pub mod timefmt;
