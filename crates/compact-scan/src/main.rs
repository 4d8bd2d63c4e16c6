mod bootstrap;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use scan_core::settings::{AnalysisConfig, Settings};
use scan_data::analysis::analyze_transcript;
use scan_report::text::render_report;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging()?;

    tracing::info!("compact-scan v{} starting", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&settings, &AnalysisConfig::default(), &mut out)
}

/// Analyse the configured transcript and write the report to `out`.
///
/// The transcript is fully analysed before anything is written, so a read
/// failure leaves `out` untouched.
fn run<W: Write>(settings: &Settings, config: &AnalysisConfig, out: &mut W) -> Result<()> {
    let path = &settings.transcript;
    tracing::debug!("Analysing {} with {:?}", path.display(), config);

    let result = analyze_transcript(path, config)
        .with_context(|| format!("Error reading transcript {}", path.display()))?;

    render_report(out, &result, config).context("Failed to write report")?;
    out.flush().context("Failed to write report")?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
