//! Centralized constants for the lobby coordinator.
//!
//! Constants are fixed and immutable, enforced at compile time. Each
//! constant has explicit bounds to prevent unbounded resource allocation.

/// Maximum display-name length in bytes.
///
/// Applied to join and rename input before any store mutation.
pub const MAX_DISPLAY_NAME_SIZE: u32 = 256;

/// Maximum number of list elements fetched in a single range read.
///
/// A waiting line longer than this is almost certainly an operational
/// problem; bounding the read prevents memory exhaustion either way.
pub const MAX_LIST_SCAN: u32 = 10_000;

/// Maximum attempts for a compare-and-swap retry loop.
pub const MAX_CAS_RETRIES: u32 = 32;

/// Initial backoff between compare-and-swap retries in milliseconds.
pub const CAS_RETRY_INITIAL_BACKOFF_MS: u64 = 10;

/// Maximum backoff between compare-and-swap retries in milliseconds.
pub const CAS_RETRY_MAX_BACKOFF_MS: u64 = 1_000;

// Compile-time bounds checks.
const _: () = assert!(MAX_DISPLAY_NAME_SIZE > 0);
const _: () = assert!(MAX_LIST_SCAN > 0);
const _: () = assert!(MAX_CAS_RETRIES > 0);
const _: () = assert!(MAX_CAS_RETRIES <= 1000);
const _: () = assert!(CAS_RETRY_INITIAL_BACKOFF_MS > 0);
const _: () = assert!(CAS_RETRY_INITIAL_BACKOFF_MS <= CAS_RETRY_MAX_BACKOFF_MS);
