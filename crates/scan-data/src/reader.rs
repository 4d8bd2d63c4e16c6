//! Transcript loading and the line-by-line extraction pass.
//!
//! Reading the file is the only fallible step: once the lines are in memory
//! every malformed or irrelevant line is skipped without error.

use std::path::{Path, PathBuf};

use scan_core::error::{Result, ScanError};
use scan_core::extract::{extract_boundary, parse_line, UsageExtractor};
use scan_core::models::{CompactBoundary, UsageRecord};
use scan_core::settings::AnalysisConfig;
use tracing::debug;

// ── Public types ──────────────────────────────────────────────────────────────

/// A transcript held fully in memory.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Where the transcript was read from.
    pub path: PathBuf,
    /// Raw lines, without line terminators.
    pub lines: Vec<String>,
}

impl Transcript {
    /// Number of lines in the file.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Output of [`extract_records`].
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Usage records in line order.
    pub records: Vec<UsageRecord>,
    /// Explicit compaction markers in line order.
    pub boundaries: Vec<CompactBoundary>,
    /// Lines that produced neither a record nor a boundary.
    pub skipped: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the whole transcript into memory.
///
/// Missing files, permission problems and invalid UTF-8 all surface as
/// [`ScanError::FileRead`].
pub fn read_transcript(path: &Path) -> Result<Transcript> {
    let content = std::fs::read_to_string(path).map_err(|source| ScanError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    debug!("Read {} lines from {}", lines.len(), path.display());

    Ok(Transcript {
        path: path.to_path_buf(),
        lines,
    })
}

/// Run the usage extractor over every line.
///
/// Line numbers are 1-based positions in `lines`, so skipped lines still
/// advance the counter.
pub fn extract_records<'a, I>(lines: I, config: &AnalysisConfig) -> Extraction
where
    I: IntoIterator<Item = &'a str>,
{
    let extractor = UsageExtractor::new(config.capacity);
    let mut extraction = Extraction::default();

    for (index, line) in lines.into_iter().enumerate() {
        let line_number = index + 1;

        let Some(value) = parse_line(line) else {
            extraction.skipped += 1;
            continue;
        };

        if let Some(boundary) = extract_boundary(line_number, &value) {
            extraction.boundaries.push(boundary);
        } else if let Some(record) = extractor.extract(line_number, &value) {
            extraction.records.push(record);
        } else {
            extraction.skipped += 1;
        }
    }

    debug!(
        "Extracted {} records and {} boundaries, skipped {} lines",
        extraction.records.len(),
        extraction.boundaries.len(),
        extraction.skipped,
    );

    extraction
}

// ── Tests ─────────────────────────────────────────────────────────────────────
