//! Core types for compact-scan.
//!
//! Holds the usage data model, per-line extraction, analysis constants,
//! CLI settings, the shared error type and number formatting helpers.

pub mod error;
pub mod extract;
pub mod formatting;
pub mod models;
pub mod settings;
