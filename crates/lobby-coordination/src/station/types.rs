//! Type definitions for service stations.

use serde::Deserialize;
use serde::Serialize;

use crate::types::Entry;
use crate::types::now_unix_ms;

/// Availability of a service station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    /// Station is open and not serving anyone.
    #[default]
    Free,
    /// Station is serving its current entry.
    Busy,
    /// Station is administratively closed.
    Closed,
}

impl StationStatus {
    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "busy" => Some(Self::Busy),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Busy => "busy",
            Self::Closed => "closed",
        }
    }
}

/// A service station record stored at `__line:station:{id}`.
///
/// Serialized as JSON for human readability and debugging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Station {
    /// Stable identifier assigned at creation.
    pub id: String,
    /// Mutable display name.
    pub name: String,
    /// Current availability.
    pub status: StationStatus,
    /// The entry in service, owned by this station while busy.
    pub current_entry: Option<Entry>,
    /// Creation timestamp (Unix ms).
    pub created_at_ms: u64,
}

impl Station {
    /// Create a new free station.
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            status: StationStatus::Free,
            current_entry: None,
            created_at_ms: now_unix_ms(),
        }
    }

    /// Generated fallback name for a station.
    pub fn default_name(id: &str) -> String {
        format!("Station {id}")
    }

    /// Whether the station currently owns an entry.
    pub fn is_busy(&self) -> bool {
        self.current_entry.is_some()
    }

    /// Apply an administrative status change, enforcing the state machine.
    ///
    /// Returns `false` and leaves the record untouched when the transition
    /// is not allowed:
    /// - `busy` is never settable administratively; it is only reached
    ///   through an assignment, which keeps `busy` equivalent to holding an
    ///   entry.
    /// - `free` on a busy station is refused; `finish` is the operation
    ///   that frees a busy station.
    ///
    /// Closing a busy station succeeds and discards its current entry
    /// without re-queueing it.
    pub fn apply_admin_status(&mut self, status: StationStatus) -> bool {
        match status {
            StationStatus::Busy => false,
            StationStatus::Free => {
                if self.is_busy() {
                    return false;
                }
                self.status = StationStatus::Free;
                true
            }
            StationStatus::Closed => {
                self.current_entry = None;
                self.status = StationStatus::Closed;
                true
            }
        }
    }
}
