//! Drop detection over consecutive usage records.
//!
//! A drop is an adjacent pair whose later total is below
//! `previous * threshold_ratio`. It usually means the context was compacted
//! or reset between the two requests.

use scan_core::models::{DropEvent, UsageRecord};

// ── DropDetector ──────────────────────────────────────────────────────────────

/// Stateless scanner comparing each record with its immediate predecessor.
#[derive(Debug, Clone, Copy)]
pub struct DropDetector {
    threshold_ratio: f64,
}

impl DropDetector {
    pub fn new(threshold_ratio: f64) -> Self {
        Self { threshold_ratio }
    }

    /// Compare one adjacent pair.
    ///
    /// Returns `None` when `previous.total` is not positive or the decrease is
    /// not strictly below the threshold.
    pub fn compare(&self, previous: &UsageRecord, current: &UsageRecord) -> Option<DropEvent> {
        if previous.total <= 0 {
            return None;
        }

        let before = previous.total as f64;
        let after = current.total as f64;
        if after >= before * self.threshold_ratio {
            return None;
        }

        Some(DropEvent {
            at_line: current.line_number,
            before_line: previous.line_number,
            before_total: previous.total,
            after_total: current.total,
            drop_fraction: 1.0 - after / before,
        })
    }

    /// Lazily yield every drop in `records`, earliest first.
    pub fn detect<'a>(
        &self,
        records: &'a [UsageRecord],
    ) -> impl Iterator<Item = DropEvent> + 'a {
        let detector = *self;
        records
            .windows(2)
            .filter_map(move |pair| detector.compare(&pair[0], &pair[1]))
    }
}

// ── DropScanner ───────────────────────────────────────────────────────────────

/// Forward-only variant of [`DropDetector::detect`] that keeps only the
/// previous record, for transcripts consumed one line at a time.
#[derive(Debug, Clone)]
pub struct DropScanner {
    detector: DropDetector,
    previous: Option<UsageRecord>,
}

impl DropScanner {
    pub fn new(detector: DropDetector) -> Self {
        Self {
            detector,
            previous: None,
        }
    }

    /// Feed the next record; returns the drop it completes, if any.
    pub fn push(&mut self, record: UsageRecord) -> Option<DropEvent> {
        let event = self
            .previous
            .as_ref()
            .and_then(|previous| self.detector.compare(previous, &record));
        self.previous = Some(record);
        event
    }

    /// The most recently pushed record.
    pub fn last(&self) -> Option<&UsageRecord> {
        self.previous.as_ref()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
