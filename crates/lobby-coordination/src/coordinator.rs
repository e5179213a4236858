//! The coordinator: public face of the waiting-line system.
//!
//! Composes the waiting line and the station registry into the operations
//! callers use. The coordinator holds no mutable state of its own (all
//! state lives in the store) and may be constructed fresh per call.
//! Absence ("unknown station", "empty line") is always signaled with
//! `None`/`false`; only store failures are errors.

use std::sync::Arc;

use anyhow::Result;
use lobby_core::ListStore;
use tracing::debug;
use tracing::warn;

use crate::config::BootstrapConfig;
use crate::line::WaitingLine;
use crate::station::Station;
use crate::station::StationRegistry;
use crate::station::StationStatus;
use crate::types::Entry;

/// Combined view of one entry's place in the system, for participant
/// status screens: its line position while waiting, or the station serving
/// it once assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStatus {
    /// 1-based line position, `None` once the entry left the line.
    pub position: Option<u32>,
    /// Id of the station serving the entry, if any.
    pub station_id: Option<String>,
    /// Display name of that station.
    pub station_name: Option<String>,
}

/// Coordinator over a shared waiting line and its service stations.
pub struct Coordinator<S: ListStore + ?Sized> {
    line: WaitingLine<S>,
    stations: StationRegistry<S>,
}

impl<S: ListStore + ?Sized + 'static> Coordinator<S> {
    /// Create a coordinator over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            line: WaitingLine::new(store.clone()),
            stations: StationRegistry::new(store),
        }
    }

    /// Seed the station registry from configuration, first bootstrap only.
    pub async fn bootstrap(&self, config: &BootstrapConfig) -> Result<bool> {
        self.stations.bootstrap(config).await
    }

    /// Join the back of the line. `None` when the name is blank.
    pub async fn join(&self, name: &str) -> Result<Option<Entry>> {
        self.line.enqueue(name).await
    }

    /// Assign the head of the line to a station.
    ///
    /// `None` when the station is unknown or closed, or the line is empty;
    /// in every refused case the line is left untouched.
    pub async fn assign_next(&self, station_id: &str) -> Result<Option<Entry>> {
        let Some(station) = self.stations.read(station_id).await? else {
            return Ok(None);
        };
        if station.status == StationStatus::Closed {
            debug!(station_id, "assignment refused: station is closed");
            return Ok(None);
        }

        let Some(entry) = self.line.dequeue_front().await? else {
            return Ok(None);
        };
        self.seat(station_id, entry).await
    }

    /// Assign a specific waiting entry to a station, out of line order.
    ///
    /// The relative order of everyone else is preserved. `None` when the
    /// station is unknown or closed, or the entry is not in the line.
    pub async fn assign_specific(&self, station_id: &str, entry_id: &str) -> Result<Option<Entry>> {
        let Some(station) = self.stations.read(station_id).await? else {
            return Ok(None);
        };
        if station.status == StationStatus::Closed {
            debug!(station_id, "assignment refused: station is closed");
            return Ok(None);
        }

        let Some(entry) = self.line.remove_by_id(entry_id).await? else {
            return Ok(None);
        };
        self.seat(station_id, entry).await
    }

    /// Seat an already-removed entry at a station.
    ///
    /// The entry is in neither the line nor a station at this point; if the
    /// station cannot take it (vanished, closed, or seated someone else
    /// concurrently), it is pushed back to the head instead of being lost.
    async fn seat(&self, station_id: &str, entry: Entry) -> Result<Option<Entry>> {
        let updated = match self
            .stations
            .try_update(station_id, |station| {
                if station.status != StationStatus::Free {
                    return false;
                }
                station.status = StationStatus::Busy;
                station.current_entry = Some(entry.clone());
                true
            })
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                let _ = self.line.prepend_front(&entry).await;
                return Err(e);
            }
        };

        if updated.is_none() {
            warn!(station_id, entry_id = %entry.id, "station could not take the entry, returning it to the head");
            self.line.prepend_front(&entry).await?;
            return Ok(None);
        }

        debug!(station_id, entry_id = %entry.id, "entry assigned");
        Ok(Some(entry))
    }

    /// Finish the current entry at a station, freeing it.
    ///
    /// Returns whether a busy station was freed; a no-op (`false`) when the
    /// station is unknown or already free.
    pub async fn finish(&self, station_id: &str) -> Result<bool> {
        let updated = self
            .stations
            .try_update(station_id, |station| {
                if !station.is_busy() {
                    return false;
                }
                station.current_entry = None;
                station.status = StationStatus::Free;
                true
            })
            .await?;

        if updated.is_some() {
            debug!(station_id, "station finished serving");
        }
        Ok(updated.is_some())
    }

    /// Move a station's current entry back to the head of the line and
    /// free the station. `None` when the station is unknown or idle.
    pub async fn return_to_front(&self, station_id: &str) -> Result<Option<Entry>> {
        let Some(station) = self.stations.read(station_id).await? else {
            return Ok(None);
        };
        let Some(entry) = station.current_entry else {
            return Ok(None);
        };

        // Head first, then free: during the window the entry is visible in
        // both places rather than in neither.
        self.line.prepend_front(&entry).await?;
        let freed = self
            .stations
            .try_update(station_id, |station| {
                if !station.is_busy() {
                    return false;
                }
                station.current_entry = None;
                station.status = StationStatus::Free;
                true
            })
            .await?;
        if freed.is_none() {
            warn!(station_id, "station stopped serving while its entry was being returned");
        }

        debug!(station_id, entry_id = %entry.id, "entry returned to the front");
        Ok(Some(entry))
    }

    /// Fresh ordered snapshot of the line, positions recomputed.
    pub async fn queue_snapshot(&self) -> Result<Vec<Entry>> {
        self.line.snapshot().await
    }

    /// All stations, in registry order.
    pub async fn all_stations(&self) -> Result<Vec<Station>> {
        self.stations.all().await
    }

    /// Current 1-based position of an entry, `None` when not in the line.
    pub async fn position_of(&self, entry_id: &str) -> Result<Option<u32>> {
        self.line.position_of(entry_id).await
    }

    /// The station currently serving an entry, `None` when it is not in
    /// service anywhere.
    pub async fn station_serving(&self, entry_id: &str) -> Result<Option<Station>> {
        self.stations.find_serving(entry_id).await
    }

    /// Combined position/serving-station view for one entry.
    pub async fn entry_status(&self, entry_id: &str) -> Result<EntryStatus> {
        let position = self.line.position_of(entry_id).await?;
        let station = self.stations.find_serving(entry_id).await?;
        Ok(EntryStatus {
            position,
            station_id: station.as_ref().map(|station| station.id.clone()),
            station_name: station.map(|station| station.name),
        })
    }

    /// Rename a station; blank input falls back to the generated default.
    pub async fn rename_station(&self, station_id: &str, new_name: &str) -> Result<Option<Station>> {
        self.stations.rename(station_id, new_name).await
    }

    /// Administratively set a station's status (free or closed).
    pub async fn set_station_status(&self, station_id: &str, status: StationStatus) -> Result<bool> {
        self.stations.set_status(station_id, status).await
    }

    /// Create a new station with the next numeric id.
    pub async fn add_station(&self) -> Result<Station> {
        self.stations.add().await
    }

    /// Remove a station; refused while it is serving an entry.
    pub async fn remove_station(&self, station_id: &str) -> Result<bool> {
        self.stations.remove(station_id).await
    }
}

#[cfg(test)]
mod tests {
    use lobby_core::DeterministicListStore;

    use super::*;

    async fn coordinator() -> Coordinator<DeterministicListStore> {
        let coordinator = Coordinator::new(DeterministicListStore::new());
        coordinator.bootstrap(&BootstrapConfig::default()).await.unwrap();
        coordinator
    }

    #[tokio::test]
    async fn assign_next_on_unknown_station_is_none() {
        let c = coordinator().await;
        c.join("Alice").await.unwrap().unwrap();
        assert!(c.assign_next("9").await.unwrap().is_none());
        assert_eq!(c.queue_snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn assign_next_on_closed_station_is_refused() {
        let c = coordinator().await;
        c.join("Alice").await.unwrap().unwrap();
        c.set_station_status("1", StationStatus::Closed).await.unwrap();

        assert!(c.assign_next("1").await.unwrap().is_none());
        // The line is untouched by the refusal.
        assert_eq!(c.queue_snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn assign_next_on_empty_line_leaves_station_free() {
        let c = coordinator().await;
        assert!(c.assign_next("1").await.unwrap().is_none());
        let station = c.all_stations().await.unwrap().remove(0);
        assert_eq!(station.status, StationStatus::Free);
        assert!(station.current_entry.is_none());
    }

    #[tokio::test]
    async fn assigning_to_a_busy_station_returns_entry_to_head() {
        let c = coordinator().await;
        c.join("Alice").await.unwrap().unwrap();
        c.join("Bob").await.unwrap().unwrap();

        c.assign_next("1").await.unwrap().unwrap();
        assert!(c.assign_next("1").await.unwrap().is_none());

        // Bob went nowhere: still at the head of the line.
        let snapshot = c.queue_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Bob");
        assert_eq!(snapshot[0].position, 1);
    }

    #[tokio::test]
    async fn every_entry_lives_in_exactly_one_place() {
        let c = coordinator().await;
        let alice = c.join("Alice").await.unwrap().unwrap();
        let bob = c.join("Bob").await.unwrap().unwrap();
        let carol = c.join("Carol").await.unwrap().unwrap();

        c.assign_next("1").await.unwrap().unwrap();
        c.assign_specific("2", &carol.id).await.unwrap().unwrap();

        for id in [&alice.id, &bob.id, &carol.id] {
            let waiting = c.position_of(id).await.unwrap().is_some();
            let serving = c
                .all_stations()
                .await
                .unwrap()
                .into_iter()
                .filter(|s| s.current_entry.as_ref().is_some_and(|e| &e.id == id))
                .count();
            assert_eq!(
                usize::from(waiting) + serving,
                1,
                "entry {id} must be in exactly one place"
            );
        }
    }

    #[tokio::test]
    async fn finish_is_a_noop_on_free_or_unknown_stations() {
        let c = coordinator().await;
        assert!(!c.finish("1").await.unwrap());
        assert!(!c.finish("9").await.unwrap());
    }

    #[tokio::test]
    async fn entry_status_follows_the_entry_through_its_lifecycle() {
        let c = coordinator().await;
        c.join("Alice").await.unwrap().unwrap();
        let bob = c.join("Bob").await.unwrap().unwrap();

        let status = c.entry_status(&bob.id).await.unwrap();
        assert_eq!(status.position, Some(2));
        assert_eq!(status.station_id, None);

        c.assign_specific("2", &bob.id).await.unwrap().unwrap();
        let status = c.entry_status(&bob.id).await.unwrap();
        assert_eq!(status.position, None);
        assert_eq!(status.station_id, Some("2".to_string()));
        assert_eq!(status.station_name, Some("Station 2".to_string()));

        c.finish("2").await.unwrap();
        let status = c.entry_status(&bob.id).await.unwrap();
        assert_eq!(status, EntryStatus::default());
    }
}
