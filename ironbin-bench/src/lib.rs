//! # IronBin Bench
//!
//! Benchmarking utilities and sample records for IronBin performance
//! testing.

pub mod encoding;
pub mod fixtures;
