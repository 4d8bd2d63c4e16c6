//! Per-line decoding of transcript entries.
//!
//! Every function here is total: a line that cannot be decoded yields `None`
//! and the caller moves on to the next line.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::trace;

use crate::models::{remaining_pct, CompactBoundary, CompactTrigger, UsageRecord};

/// Path of the usage object inside a transcript entry.
pub const USAGE_PATH: &[&str] = &["message", "usage"];

// ── Generic accessors ─────────────────────────────────────────────────────────

/// Deserialize one raw line into a generic JSON value.
///
/// Malformed JSON and blank lines return `None`.
pub fn parse_line(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("skipping malformed line: {}", e);
            None
        }
    }
}

/// Follow `path` through nested objects.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
///
/// # Examples
///
/// ```
/// use scan_core::extract::json_path;
/// use serde_json::json;
///
/// let entry = json!({"message": {"usage": {"input_tokens": 3}}});
/// assert!(json_path(&entry, &["message", "usage"]).is_some());
/// assert!(json_path(&entry, &["message", "model"]).is_none());
/// ```
pub fn json_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Read an integer field, sign included; missing or non-integer values are 0.
fn counter(obj: &Value, key: &str) -> i64 {
    obj.get(key).and_then(Value::as_i64).unwrap_or(0)
}

/// Parse the top-level `timestamp` of an entry.
///
/// Accepts RFC 3339 strings (including a `Z` suffix) and Unix seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value.get("timestamp")? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
        _ => None,
    }
}

// ── UsageExtractor ────────────────────────────────────────────────────────────

/// Turns transcript entries into [`UsageRecord`]s.
#[derive(Debug, Clone, Copy)]
pub struct UsageExtractor {
    capacity: u64,
}

impl UsageExtractor {
    pub fn new(capacity: u64) -> Self {
        Self { capacity }
    }

    /// Parse and extract in one step.
    pub fn extract_line(&self, line_number: usize, raw: &str) -> Option<UsageRecord> {
        let value = parse_line(raw)?;
        self.extract(line_number, &value)
    }

    /// Build a record from `message.usage`.
    ///
    /// Skips entries whose usage is absent, not an object, empty, or whose
    /// context counters do not sum to a positive total.
    pub fn extract(&self, line_number: usize, value: &Value) -> Option<UsageRecord> {
        let usage = json_path(value, USAGE_PATH)?;
        if usage.as_object()?.is_empty() {
            return None;
        }

        let input = counter(usage, "input_tokens");
        let cache_creation = counter(usage, "cache_creation_input_tokens");
        let cache_read = counter(usage, "cache_read_input_tokens");
        let total = input
            .saturating_add(cache_creation)
            .saturating_add(cache_read);
        if total <= 0 {
            trace!("line {}: usage total {} is not positive", line_number, total);
            return None;
        }

        Some(UsageRecord {
            line_number,
            input,
            cache_creation,
            cache_read,
            output: counter(usage, "output_tokens"),
            total,
            remaining_pct: remaining_pct(total, self.capacity),
            timestamp: parse_timestamp(value),
        })
    }
}

// ── Compact boundaries ────────────────────────────────────────────────────────

/// Recognise an explicit `{"type":"system","subtype":"compact_boundary"}` marker.
pub fn extract_boundary(line_number: usize, value: &Value) -> Option<CompactBoundary> {
    let is_system = value.get("type").and_then(Value::as_str) == Some("system");
    let is_boundary = value.get("subtype").and_then(Value::as_str) == Some("compact_boundary");
    if !(is_system && is_boundary) {
        return None;
    }

    let metadata = value.get("compactMetadata");
    let trigger = CompactTrigger::from_label(
        metadata
            .and_then(|m| m.get("trigger"))
            .and_then(Value::as_str),
    );
    let pre_tokens = metadata
        .and_then(|m| m.get("preTokens"))
        .and_then(Value::as_u64);
    let post_tokens = metadata
        .and_then(|m| m.get("postTokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Some(CompactBoundary {
        line_number,
        trigger,
        pre_tokens,
        post_tokens,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
