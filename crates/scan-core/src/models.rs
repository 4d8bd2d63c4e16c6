use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::formatting::round_half_even;

/// Context usage decoded from one transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// 1-based position of the line in the transcript.
    pub line_number: usize,
    /// Prompt tokens not served from the cache.
    pub input: i64,
    /// Tokens written into the prompt cache.
    pub cache_creation: i64,
    /// Tokens read from the prompt cache.
    pub cache_read: i64,
    /// Completion tokens. Not part of [`total`](Self::total).
    #[serde(default)]
    pub output: i64,
    /// `input + cache_creation + cache_read`: the context occupied by the
    /// request. Always positive; counters are summed as written, signs included.
    pub total: i64,
    /// `round((capacity - total) / capacity * 100)`, unclamped.
    pub remaining_pct: i64,
    /// Top-level `timestamp` of the line, when present and parseable.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A sharp decrease in context usage between two adjacent records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEvent {
    /// Line of the record after the drop.
    pub at_line: usize,
    /// Line of the record before the drop.
    pub before_line: usize,
    pub before_total: i64,
    pub after_total: i64,
    /// `1 - after_total / before_total`, in `(0, 1]`.
    pub drop_fraction: f64,
}

impl DropEvent {
    /// Tokens released by the drop.
    pub fn tokens_dropped(&self) -> i64 {
        self.before_total.saturating_sub(self.after_total)
    }

    /// The drop as a whole percentage.
    pub fn drop_pct(&self) -> i64 {
        round_half_even(self.drop_fraction * 100.0)
    }

    /// Remaining context percentage right before the drop.
    pub fn remaining_pct_before(&self, capacity: u64) -> i64 {
        remaining_pct(self.before_total, capacity)
    }

    /// Remaining context percentage right after the drop.
    pub fn remaining_pct_after(&self, capacity: u64) -> i64 {
        remaining_pct(self.after_total, capacity)
    }
}

/// What started an explicit compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactTrigger {
    Auto,
    Manual,
}

impl CompactTrigger {
    /// Map the transcript's `trigger` string; anything other than `"auto"`
    /// is treated as manual.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("auto") => CompactTrigger::Auto,
            _ => CompactTrigger::Manual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompactTrigger::Auto => "auto",
            CompactTrigger::Manual => "manual",
        }
    }
}

impl std::fmt::Display for CompactTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicit `compact_boundary` system line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactBoundary {
    /// 1-based position of the marker line.
    pub line_number: usize,
    pub trigger: CompactTrigger,
    /// Context size before compaction, if the marker records it.
    #[serde(default)]
    pub pre_tokens: Option<u64>,
    /// Context size after compaction.
    #[serde(default)]
    pub post_tokens: u64,
}

/// Percentage of `capacity` still free after `total` tokens, with exact
/// halves rounded to even and no clamping to `[0, 100]`.
///
/// # Examples
///
/// ```
/// use scan_core::models::remaining_pct;
///
/// assert_eq!(remaining_pct(100, 200_000), 100);
/// assert_eq!(remaining_pct(150_000, 200_000), 25);
/// assert_eq!(remaining_pct(3_000, 200_000), 98);
/// assert_eq!(remaining_pct(250_000, 200_000), -25);
/// ```
pub fn remaining_pct(total: i64, capacity: u64) -> i64 {
    let capacity = capacity as f64;
    round_half_even((capacity - total as f64) / capacity * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_event(before: i64, after: i64) -> DropEvent {
        DropEvent {
            at_line: 8,
            before_line: 5,
            before_total: before,
            after_total: after,
            drop_fraction: 1.0 - after as f64 / before as f64,
        }
    }

    // ── remaining_pct ──────────────────────────────────────────────────────

    #[test]
    fn test_remaining_pct_empty_context() {
        assert_eq!(remaining_pct(0, 200_000), 100);
    }

    #[test]
    fn test_remaining_pct_full_context() {
        assert_eq!(remaining_pct(200_000, 200_000), 0);
    }

    #[test]
    fn test_remaining_pct_rounds_halves_to_even() {
        // 98.5 % and 99.5 % remaining.
        assert_eq!(remaining_pct(3_000, 200_000), 98);
        assert_eq!(remaining_pct(1_000, 200_000), 100);
        // 87.5 % and 12.5 %.
        assert_eq!(remaining_pct(25_000, 200_000), 88);
        assert_eq!(remaining_pct(175_000, 200_000), 12);
    }

    #[test]
    fn test_remaining_pct_odd_thousands() {
        // Every odd multiple of 1_000 lands on an exact half.
        let expected = [(5_000, 98), (7_000, 96), (9_000, 96), (11_000, 94)];
        for (total, pct) in expected {
            assert_eq!(remaining_pct(total, 200_000), pct, "total = {total}");
        }
    }

    #[test]
    fn test_remaining_pct_over_capacity_is_negative() {
        assert_eq!(remaining_pct(225_000, 200_000), -12);
        assert_eq!(remaining_pct(400_000, 200_000), -100);
    }

    #[test]
    fn test_remaining_pct_negative_total_exceeds_hundred() {
        assert_eq!(remaining_pct(-20_000, 200_000), 110);
    }

    // ── DropEvent ──────────────────────────────────────────────────────────

    #[test]
    fn test_drop_event_tokens_dropped() {
        assert_eq!(drop_event(100_000, 20_000).tokens_dropped(), 80_000);
    }

    #[test]
    fn test_drop_event_drop_pct() {
        assert_eq!(drop_event(100_000, 20_000).drop_pct(), 80);
        assert_eq!(drop_event(150_000, 40_000).drop_pct(), 73);
    }

    #[test]
    fn test_drop_event_drop_pct_half_to_even() {
        // 1 - 75_000 / 200_000 = 62.5 %.
        assert_eq!(drop_event(200_000, 75_000).drop_pct(), 62);
    }

    #[test]
    fn test_drop_event_remaining_before() {
        assert_eq!(drop_event(180_000, 30_000).remaining_pct_before(200_000), 10);
    }

    #[test]
    fn test_drop_event_remaining_after() {
        assert_eq!(drop_event(180_000, 30_000).remaining_pct_after(200_000), 85);
    }

    // ── CompactTrigger ─────────────────────────────────────────────────────

    #[test]
    fn test_compact_trigger_from_label() {
        assert_eq!(CompactTrigger::from_label(Some("auto")), CompactTrigger::Auto);
        assert_eq!(
            CompactTrigger::from_label(Some("manual")),
            CompactTrigger::Manual
        );
        assert_eq!(CompactTrigger::from_label(Some("other")), CompactTrigger::Manual);
        assert_eq!(CompactTrigger::from_label(None), CompactTrigger::Manual);
    }

    #[test]
    fn test_compact_trigger_serde() {
        let json = serde_json::to_string(&CompactTrigger::Auto).unwrap();
        assert_eq!(json, r#""auto""#);
        let back: CompactTrigger = serde_json::from_str(r#""manual""#).unwrap();
        assert_eq!(back, CompactTrigger::Manual);
    }

    #[test]
    fn test_compact_trigger_display() {
        assert_eq!(CompactTrigger::Auto.to_string(), "auto");
    }
}
