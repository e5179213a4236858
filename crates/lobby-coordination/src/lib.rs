//! Coordination of a single shared waiting line and its service stations.
//!
//! This crate owns the waiting-line ordering, the station state machine,
//! and the invariants linking them, implemented against the
//! [`lobby_core::ListStore`] contract: a remote key-value/list store that
//! guarantees atomicity of individual primitives only, with no multi-step
//! transactions.
//!
//! - [`WaitingLine`] - strict arrival order, head service, order-preserving
//!   targeted removal, derived positions
//! - [`StationRegistry`] - per-station records, the registry of known ids,
//!   and the free/busy/closed state machine, mutated through
//!   compare-and-swap with bounded retry
//! - [`Coordinator`] - the public face composing the two
//!
//! ## Example
//!
//! ```
//! use lobby_coordination::{BootstrapConfig, Coordinator};
//! use lobby_core::DeterministicListStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let coordinator = Coordinator::new(DeterministicListStore::new());
//! coordinator.bootstrap(&BootstrapConfig::default()).await?;
//!
//! let alice = coordinator.join("Alice").await?.expect("valid name");
//! let served = coordinator.assign_next("1").await?.expect("line not empty");
//! assert_eq!(served.id, alice.id);
//! coordinator.finish("1").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod coordinator;
pub mod keys;
mod line;
mod station;
mod types;

pub use config::BootstrapConfig;
pub use config::StationSeed;
pub use coordinator::Coordinator;
pub use coordinator::EntryStatus;
pub use line::WaitingLine;
pub use station::Station;
pub use station::StationRegistry;
pub use station::StationStatus;
pub use types::Entry;
pub use types::now_unix_ms;
