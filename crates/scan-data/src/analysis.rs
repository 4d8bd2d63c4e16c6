//! Main analysis pipeline for compact-scan.
//!
//! Reads the transcript, extracts usage records and runs drop detection,
//! returning an [`AnalysisResult`] ready for the report.

use std::path::Path;

use scan_core::error::Result;
use scan_core::models::{CompactBoundary, DropEvent, UsageRecord};
use scan_core::settings::AnalysisConfig;
use tracing::debug;

use crate::detector::DropDetector;
use crate::reader::{extract_records, read_transcript};

// ── Public types ──────────────────────────────────────────────────────────────

/// The complete output of one transcript scan.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisResult {
    /// Number of lines in the transcript, valid or not.
    pub total_lines: usize,
    /// Usage records in line order.
    pub records: Vec<UsageRecord>,
    /// Detected drops, earliest first.
    pub drops: Vec<DropEvent>,
    /// Explicit compaction markers, in line order.
    pub boundaries: Vec<CompactBoundary>,
    /// Lines that yielded neither a record nor a boundary.
    pub skipped_lines: usize,
}

impl AnalysisResult {
    /// The most recent usage record, if any.
    pub fn latest(&self) -> Option<&UsageRecord> {
        self.records.last()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Analyse lines already held in memory.
pub fn analyze_lines<'a, I>(lines: I, config: &AnalysisConfig) -> AnalysisResult
where
    I: IntoIterator<Item = &'a str>,
{
    let mut total_lines = 0usize;
    let counted = lines.into_iter().inspect(|_| total_lines += 1);
    let extraction = extract_records(counted, config);

    let drops: Vec<DropEvent> = DropDetector::new(config.threshold_ratio)
        .detect(&extraction.records)
        .collect();

    debug!(
        "Analysis: {} lines, {} records, {} drops, {} boundaries",
        total_lines,
        extraction.records.len(),
        drops.len(),
        extraction.boundaries.len(),
    );

    AnalysisResult {
        total_lines,
        records: extraction.records,
        drops,
        boundaries: extraction.boundaries,
        skipped_lines: extraction.skipped,
    }
}

/// Read `path` and analyse it.
///
/// Fails only when the file cannot be read; nothing is produced in that case.
pub fn analyze_transcript(path: &Path, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let transcript = read_transcript(path)?;
    Ok(analyze_lines(
        transcript.lines.iter().map(String::as_str),
        config,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use scan_core::error::ScanError;
    use serde_json::json;
    use tempfile::TempDir;

    fn usage(cache_read: u64) -> String {
        json!({
            "type": "assistant",
            "message": {
                "usage": {
                    "input_tokens": 0,
                    "cache_creation_input_tokens": 0,
                    "cache_read_input_tokens": cache_read,
                }
            }
        })
        .to_string()
    }

    fn analyze(lines: &[&str]) -> AnalysisResult {
        analyze_lines(lines.iter().copied(), &AnalysisConfig::default())
    }

    #[test]
    fn test_analyze_lines_counts_every_line() {
        let a = usage(1_000);
        let result = analyze(&[&a, "", "garbage", &a]);
        assert_eq!(result.total_lines, 4);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.skipped_lines, 2);
    }

    #[test]
    fn test_analyze_lines_reports_drop_at_true_line() {
        let high = usage(100_000);
        let low = usage(20_000);
        let result = analyze(&[&high, "{oops", &low]);

        assert_eq!(result.drops.len(), 1);
        assert_eq!(result.drops[0].at_line, 3);
        assert_eq!(result.drops[0].before_line, 1);
    }

    #[test]
    fn test_skipped_lines_do_not_reset_adjacency() {
        let high = usage(150_000);
        let low = usage(10_000);
        let user = json!({"type": "user", "message": {"content": "go on"}}).to_string();
        let result = analyze(&[&high, &user, "", "{bad", &low]);

        assert_eq!(result.drops.len(), 1);
        assert_eq!(result.drops[0].before_total, 150_000);
        assert_eq!(result.drops[0].after_total, 10_000);
    }

    #[test]
    fn test_boundary_does_not_reset_adjacency() {
        let high = usage(150_000);
        let marker = json!({
            "type": "system",
            "subtype": "compact_boundary",
            "compactMetadata": {"trigger": "auto", "preTokens": 150_000, "postTokens": 9_000},
        })
        .to_string();
        let low = usage(9_000);
        let result = analyze(&[&high, &marker, &low]);

        assert_eq!(result.boundaries.len(), 1);
        assert_eq!(result.drops.len(), 1);
        assert_eq!(result.drops[0].at_line, 3);
    }

    #[test]
    fn test_analyze_lines_empty() {
        let result = analyze(&[]);
        assert_eq!(result.total_lines, 0);
        assert!(result.records.is_empty());
        assert!(result.drops.is_empty());
        assert!(result.latest().is_none());
    }

    #[test]
    fn test_latest_is_last_record() {
        let a = usage(1_000);
        let b = usage(2_000);
        let result = analyze(&[&a, &b, "noise"]);
        assert_eq!(result.latest().map(|r| r.total), Some(2_000));
    }

    #[test]
    fn test_analyze_transcript_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        let content = [usage(100_000), "not json".to_string(), usage(20_000)].join("\n");
        std::fs::write(&path, content).unwrap();

        let result = analyze_transcript(&path, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.total_lines, 3);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.drops.len(), 1);
    }

    #[test]
    fn test_analyze_transcript_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        let content = [usage(180_000), usage(30_000), usage(60_000)].join("\n");
        std::fs::write(&path, content).unwrap();

        let config = AnalysisConfig::default();
        let first = analyze_transcript(&path, &config).unwrap();
        let second = analyze_transcript(&path, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_analyze_transcript_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = analyze_transcript(&dir.path().join("absent.jsonl"), &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::FileRead { .. }));
    }
}
