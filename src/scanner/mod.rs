//! File discovery: sequential directory walker and cache/image classification.

pub mod patterns;
pub mod walker;
