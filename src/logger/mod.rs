//! Run logging: plain-text error log of failed writes plus an optional JSONL
//! activity log.

pub mod error_log;
pub mod jsonl;
