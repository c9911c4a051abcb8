//! Platform abstraction layer: timestamp reads and creation-time writes.

pub mod pal;
