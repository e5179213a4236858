//! Pure key-derivation and token functions.
//!
//! All functions are deterministic and side-effect free: time and
//! randomness are passed in explicitly by callers, which keeps every
//! derivation unit-testable.

/// Prefix shared by every key this crate owns.
pub const LINE_PREFIX: &str = "__line:";

/// Prefix of removal tombstones written into the waiting list.
pub const TOMBSTONE_PREFIX: &str = "__line:tombstone:";

/// Key of the waiting-line list.
///
/// # Example
///
/// ```
/// assert_eq!(lobby_coordination::keys::waiting_key(), "__line:waiting");
/// ```
#[inline]
pub fn waiting_key() -> String {
    format!("{}waiting", LINE_PREFIX)
}

/// Key of the station-registry list (ordered station ids).
///
/// # Example
///
/// ```
/// assert_eq!(lobby_coordination::keys::registry_key(), "__line:stations");
/// ```
#[inline]
pub fn registry_key() -> String {
    format!("{}stations", LINE_PREFIX)
}

/// Key of a single station record.
///
/// # Example
///
/// ```
/// assert_eq!(lobby_coordination::keys::station_key("2"), "__line:station:2");
/// ```
#[inline]
pub fn station_key(station_id: &str) -> String {
    format!("{}station:{}", LINE_PREFIX, station_id)
}

/// Build the tombstone written over a list slot during targeted removal.
///
/// The token must be fresh per call: the slot is first overwritten with the
/// tombstone, then every element matching it is removed, and a reused value
/// could collide with a concurrent removal and delete the wrong slot.
#[inline]
pub fn removal_tombstone(entry_id: &str, token: u64) -> String {
    format!("{}{}:{:016x}", TOMBSTONE_PREFIX, entry_id, token)
}

/// Build an opaque entry id from the join time and a random nonce.
#[inline]
pub fn entry_token(joined_at_ms: u64, nonce: u64) -> String {
    format!("e-{:x}-{:012x}", joined_at_ms, nonce & 0xffff_ffff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(waiting_key(), "__line:waiting");
        assert_eq!(registry_key(), "__line:stations");
        assert_eq!(station_key("7"), "__line:station:7");
        assert!(station_key("7").starts_with(LINE_PREFIX));
    }

    #[test]
    fn tombstones_differ_by_token() {
        let a = removal_tombstone("e-1", 1);
        let b = removal_tombstone("e-1", 2);
        assert_ne!(a, b);
        assert!(a.starts_with(TOMBSTONE_PREFIX));
    }

    #[test]
    fn entry_tokens_differ_by_nonce() {
        let a = entry_token(1_000, 42);
        let b = entry_token(1_000, 43);
        assert_ne!(a, b);
        assert!(a.starts_with("e-"));
    }
}
