use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, ScanError};

// ── Constants ──────────────────────────────────────────────────────────────────

/// Context window size the remaining percentage is computed against.
pub const CAPACITY: u64 = 200_000;

/// A record whose total falls below `previous * THRESHOLD_RATIO` is a drop.
pub const THRESHOLD_RATIO: f64 = 0.7;

/// Number of trailing usage records shown in the report.
pub const TAIL_SIZE: usize = 20;

/// Transcript read when no path is given on the command line.
pub const DEFAULT_TRANSCRIPT: &str = "transcript.jsonl";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Scan a JSONL transcript for context usage and auto-compact drops
#[derive(Parser, Debug, Clone)]
#[command(
    name = "compact-scan",
    about = "Scan a JSONL transcript for context usage and auto-compact drops",
    version
)]
pub struct Settings {
    /// Path to the JSONL transcript
    #[arg(default_value = DEFAULT_TRANSCRIPT)]
    pub transcript: PathBuf,
}

// ── AnalysisConfig ─────────────────────────────────────────────────────────────

/// Fixed parameters shared by the extractor, the drop detector and the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Context capacity in tokens.
    pub capacity: u64,
    /// Ratio below which the next total counts as a drop.
    pub threshold_ratio: f64,
    /// How many trailing records the report shows.
    pub tail_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            capacity: CAPACITY,
            threshold_ratio: THRESHOLD_RATIO,
            tail_size: TAIL_SIZE,
        }
    }
}

impl AnalysisConfig {
    /// Build a validated configuration.
    ///
    /// Rejects a zero capacity, a threshold ratio outside `(0, 1]` and a zero
    /// tail size.
    pub fn new(capacity: u64, threshold_ratio: f64, tail_size: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ScanError::InvalidConfig(
                "capacity must be positive".to_string(),
            ));
        }
        if !(threshold_ratio > 0.0 && threshold_ratio <= 1.0) {
            return Err(ScanError::InvalidConfig(format!(
                "threshold ratio must be in (0, 1], got {}",
                threshold_ratio
            )));
        }
        if tail_size == 0 {
            return Err(ScanError::InvalidConfig(
                "tail size must be positive".to_string(),
            ));
        }
        Ok(Self {
            capacity,
            threshold_ratio,
            tail_size,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
