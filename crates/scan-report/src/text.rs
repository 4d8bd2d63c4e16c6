//! Plain-text transcript report.
//!
//! Renders the line count, a table of the most recent usage records, every
//! detected drop and every explicit compaction marker.

use std::io::{self, Write};

use scan_core::error::Result;
use scan_core::formatting::{format_signed, format_tokens};
use scan_core::models::{CompactBoundary, DropEvent, UsageRecord};
use scan_core::settings::AnalysisConfig;
use scan_data::analysis::AnalysisResult;

const COLUMNS: [(&str, usize); 8] = [
    ("Line", 6),
    ("Time", 19),
    ("Input", 10),
    ("Cache create", 13),
    ("Cache read", 11),
    ("Output", 9),
    ("Total", 10),
    ("Remaining", 10),
];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The last `n` records, or all of them when there are fewer.
pub fn tail(records: &[UsageRecord], n: usize) -> &[UsageRecord] {
    &records[records.len().saturating_sub(n)..]
}

/// Write the full report for `result` to `out`.
///
/// Write failures surface as [`ScanError::Io`](scan_core::error::ScanError::Io).
pub fn render_report<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    config: &AnalysisConfig,
) -> Result<()> {
    writeln!(out, "Total lines in transcript: {}", result.total_lines)?;
    writeln!(out)?;

    render_tail(out, &result.records, config.tail_size)?;
    writeln!(out)?;

    if result.drops.is_empty() {
        writeln!(out, "No context drops detected")?;
    } else {
        for event in &result.drops {
            render_drop(out, event, config.capacity)?;
        }
    }

    if !result.boundaries.is_empty() {
        writeln!(out)?;
        for boundary in &result.boundaries {
            render_boundary(out, boundary)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Records: {}, skipped lines: {}, drops: {}, compact boundaries: {}",
        result.records.len(),
        result.skipped_lines,
        result.drops.len(),
        result.boundaries.len(),
    )?;
    writeln!(out, "Analysis complete")?;
    Ok(())
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_tail<W: Write>(out: &mut W, records: &[UsageRecord], tail_size: usize) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No usage records found");
    }

    let shown = tail(records, tail_size);
    writeln!(
        out,
        "Last {} usage records (of {}):",
        shown.len(),
        records.len()
    )?;

    let header: Vec<String> = COLUMNS
        .iter()
        .map(|(title, width)| format!("{:>width$}", title, width = *width))
        .collect();
    writeln!(out, "{}", header.join("  "))?;

    for record in shown {
        let cells = [
            record.line_number.to_string(),
            record
                .timestamp
                .map(|ts| ts.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_signed(record.input),
            format_signed(record.cache_creation),
            format_signed(record.cache_read),
            format_signed(record.output),
            format_signed(record.total),
            format!("{}%", record.remaining_pct),
        ];
        let row: Vec<String> = cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(cell, (_, width))| format!("{:>width$}", cell, width = *width))
            .collect();
        writeln!(out, "{}", row.join("  "))?;
    }
    Ok(())
}

fn render_drop<W: Write>(out: &mut W, event: &DropEvent, capacity: u64) -> io::Result<()> {
    writeln!(out, "Potential auto-compact at line {}:", event.at_line)?;
    writeln!(
        out,
        "  Previous context: {} tokens (line {}, {}% remaining)",
        format_signed(event.before_total),
        event.before_line,
        event.remaining_pct_before(capacity)
    )?;
    writeln!(
        out,
        "  New context: {} tokens ({}% remaining)",
        format_signed(event.after_total),
        event.remaining_pct_after(capacity)
    )?;
    writeln!(
        out,
        "  Drop: {} tokens ({}%)",
        format_signed(event.tokens_dropped()),
        event.drop_pct()
    )
}

fn render_boundary<W: Write>(out: &mut W, boundary: &CompactBoundary) -> io::Result<()> {
    writeln!(
        out,
        "Compact boundary at line {} ({}):",
        boundary.line_number, boundary.trigger
    )?;
    let before = boundary
        .pre_tokens
        .map(|t| format!("{} tokens", format_tokens(t)))
        .unwrap_or_else(|| "unknown".to_string());
    writeln!(out, "  Before: {}", before)?;
    writeln!(out, "  After: {} tokens", format_tokens(boundary.post_tokens))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
