//! Presentation layer for compact-scan.
//!
//! Turns an [`scan_data::analysis::AnalysisResult`] into the plain-text
//! report printed by the binary.

pub mod text;

pub use scan_core as core;
pub use scan_data as data;
