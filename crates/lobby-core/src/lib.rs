//! Store contract and shared types for the lobby coordinator.
//!
//! This crate provides the foundational pieces the coordination layer is
//! built on. It is designed to be a lightweight dependency that can be used
//! by both the coordination crate and storage backends.
//!
//! # Key Components
//!
//! - **Traits**: [`ListStore`], the key-value/list contract every backend
//!   implements
//! - **Errors**: [`StoreError`], the explicit failure taxonomy of a backend
//! - **Constants**: fixed resource limits, checked at compile time
//! - **Testing**: [`DeterministicListStore`], a thread-safe in-memory
//!   backend with predictable behavior for tests and local mode

pub mod constants;
pub mod error;
pub mod inmemory;
pub mod traits;

pub use constants::CAS_RETRY_INITIAL_BACKOFF_MS;
pub use constants::CAS_RETRY_MAX_BACKOFF_MS;
pub use constants::MAX_CAS_RETRIES;
pub use constants::MAX_DISPLAY_NAME_SIZE;
pub use constants::MAX_LIST_SCAN;
pub use error::StoreError;
pub use inmemory::DeterministicListStore;
pub use traits::ListStore;
