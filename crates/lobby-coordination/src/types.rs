//! Shared types for the waiting line.

use serde::Deserialize;
use serde::Serialize;

/// A waiting participant.
///
/// Serialized as JSON for human readability and debugging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Opaque unique token assigned at join time.
    pub id: String,
    /// Display name, non-empty after validation.
    pub name: String,
    /// Join timestamp (Unix ms). Diagnostics only; ordering is positional.
    pub joined_at_ms: u64,
    /// 1-based rank in the line at the moment it was computed.
    ///
    /// Recomputed from the current line order on every snapshot; any value
    /// read earlier is a stale hint. 0 = not in the line (e.g. in service).
    #[serde(default)]
    pub position: u32,
}

impl Entry {
    /// Create a new entry at the given join time. Position starts unknown.
    pub fn new(id: String, name: String, joined_at_ms: u64) -> Self {
        Self {
            id,
            name,
            joined_at_ms,
            position: 0,
        }
    }
}

/// Get current Unix timestamp in milliseconds.
///
/// Falls back to 0 if system time is before the Unix epoch, so a
/// misconfigured clock degrades diagnostics instead of panicking.
#[inline]
pub fn now_unix_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
