//! Data layer for compact-scan.
//!
//! Loads a JSONL transcript, extracts per-line usage records and detects
//! sharp drops in context usage between consecutive records.

pub mod analysis;
pub mod detector;
pub mod reader;

pub use scan_core as core;
