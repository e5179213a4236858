//! Station registry operations.

use std::time::Duration;

use anyhow::Context as _;
use anyhow::Result;
use anyhow::bail;
use lobby_core::CAS_RETRY_INITIAL_BACKOFF_MS;
use lobby_core::CAS_RETRY_MAX_BACKOFF_MS;
use lobby_core::ListStore;
use lobby_core::MAX_CAS_RETRIES;
use lobby_core::MAX_DISPLAY_NAME_SIZE;
use lobby_core::MAX_LIST_SCAN;
use lobby_core::StoreError;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Station;
use super::StationRegistry;
use super::StationStatus;
use crate::config::BootstrapConfig;
use crate::keys;

impl<S: ListStore + ?Sized + 'static> StationRegistry<S> {
    /// Read a single station record. `None` when the id is unknown.
    pub async fn read(&self, station_id: &str) -> Result<Option<Station>> {
        Ok(self
            .read_raw(&keys::station_key(station_id))
            .await?
            .map(|(_, station)| station))
    }

    /// All known stations, in registry order.
    ///
    /// A registry id whose record is missing (e.g. a half-finished removal)
    /// is skipped with a warning rather than failing the whole read.
    pub async fn all(&self) -> Result<Vec<Station>> {
        let ids = self.station_ids().await?;
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let record_keys: Vec<String> = ids.iter().map(|id| keys::station_key(id)).collect();
        let values = self.store.get_many(&record_keys).await?;

        let mut stations = Vec::with_capacity(ids.len());
        for (id, value) in ids.iter().zip(values) {
            match value {
                Some(json) => stations.push(parse_station(&json)?),
                None => warn!(station_id = %id, "registry id has no station record"),
            }
        }
        Ok(stations)
    }

    /// The ordered set of known station ids.
    pub async fn station_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .list_range(&keys::registry_key(), 0, MAX_LIST_SCAN as i64 - 1)
            .await?)
    }

    /// The station currently serving the given entry, if any.
    pub async fn find_serving(&self, entry_id: &str) -> Result<Option<Station>> {
        let stations = self.all().await?;
        Ok(stations.into_iter().find(|station| {
            station
                .current_entry
                .as_ref()
                .is_some_and(|entry| entry.id == entry_id)
        }))
    }

    /// Create a new station with the next numeric id and append it to the
    /// registry.
    pub async fn add(&self) -> Result<Station> {
        let mut attempt = 0u32;
        let mut backoff_ms = CAS_RETRY_INITIAL_BACKOFF_MS;

        loop {
            let ids = self.station_ids().await?;
            let next = ids.iter().filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0) + 1;
            let id = next.to_string();

            let station = Station::new(id.clone(), Station::default_name(&id));
            let json = serde_json::to_string(&station)?;

            match self
                .store
                .compare_and_swap(&keys::station_key(&id), None, &json)
                .await
            {
                Ok(()) => {
                    self.store.list_append(&keys::registry_key(), &id).await?;
                    info!(station_id = %id, "station added");
                    return Ok(station);
                }
                Err(StoreError::CompareAndSwapFailed { .. }) => {
                    // Another writer claimed this id; recompute and retry.
                    attempt += 1;
                    if attempt >= MAX_CAS_RETRIES {
                        bail!("station add CAS failed after {} attempts (max retries exceeded)", attempt);
                    }
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(CAS_RETRY_MAX_BACKOFF_MS);
                }
                Err(e) => bail!("station add failed: {}", e),
            }
        }
    }

    /// Delete a station record and its registry reference.
    ///
    /// Refused (returning `false`) when the id is unknown or the station
    /// currently holds an entry.
    pub async fn remove(&self, station_id: &str) -> Result<bool> {
        let Some(station) = self.read(station_id).await? else {
            return Ok(false);
        };
        if station.is_busy() {
            warn!(station_id, "refusing to remove a station that is serving an entry");
            return Ok(false);
        }

        self.store.delete(&keys::station_key(station_id)).await?;
        self.store
            .list_remove_matching(&keys::registry_key(), station_id)
            .await?;
        info!(station_id, "station removed");
        Ok(true)
    }

    /// Rename a station. Input is trimmed; a blank or oversized name falls
    /// back to the generated default. `None` when the id is unknown.
    pub async fn rename(&self, station_id: &str, new_name: &str) -> Result<Option<Station>> {
        let trimmed = new_name.trim();
        let name = if trimmed.is_empty() || trimmed.len() > MAX_DISPLAY_NAME_SIZE as usize {
            Station::default_name(station_id)
        } else {
            trimmed.to_string()
        };

        let updated = self
            .try_update(station_id, |station| {
                station.name = name.clone();
                true
            })
            .await?;
        if let Some(station) = &updated {
            debug!(station_id, name = %station.name, "station renamed");
        }
        Ok(updated)
    }

    /// Administratively set a station's status.
    ///
    /// Transition rules live in [`Station::apply_admin_status`]: only
    /// `free` and `closed` are settable, and closing discards any entry in
    /// service. Returns `false` when the id is unknown or the transition is
    /// refused.
    pub async fn set_status(&self, station_id: &str, status: StationStatus) -> Result<bool> {
        let updated = self
            .try_update(station_id, |station| station.apply_admin_status(status))
            .await?;
        if let Some(station) = &updated {
            debug!(station_id, status = station.status.as_str(), "station status set");
        }
        Ok(updated.is_some())
    }

    /// Seed the registry from configuration.
    ///
    /// Runs only when no registry exists yet, so names applied later by
    /// [`StationRegistry::rename`] are never overwritten by configuration.
    /// Returns whether seeding happened.
    pub async fn bootstrap(&self, config: &BootstrapConfig) -> Result<bool> {
        if self.store.exists(&keys::registry_key()).await? {
            debug!("station registry already seeded");
            return Ok(false);
        }

        for seed in &config.stations {
            let station = Station::new(seed.id.clone(), seed.display_name());
            let json = serde_json::to_string(&station)?;
            match self
                .store
                .compare_and_swap(&keys::station_key(&seed.id), None, &json)
                .await
            {
                Ok(()) => {
                    self.store.list_append(&keys::registry_key(), &seed.id).await?;
                }
                Err(StoreError::CompareAndSwapFailed { .. }) => {
                    // A concurrent bootstrap won this record; keep theirs.
                    debug!(station_id = %seed.id, "station already exists, keeping current record");
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(count = config.stations.len(), "station registry seeded");
        Ok(true)
    }

    /// Read-modify-write a station record through compare-and-swap with
    /// bounded exponential retry.
    ///
    /// `update_fn` may veto by returning `false`, which aborts without
    /// writing. Returns the updated record, or `None` when the id is
    /// unknown or the update was vetoed.
    pub async fn try_update<F>(&self, station_id: &str, update_fn: F) -> Result<Option<Station>>
    where
        F: Fn(&mut Station) -> bool,
    {
        let key = keys::station_key(station_id);
        let mut attempt = 0u32;
        let mut backoff_ms = CAS_RETRY_INITIAL_BACKOFF_MS;

        loop {
            let Some((current_json, current)) = self.read_raw(&key).await? else {
                return Ok(None);
            };

            let mut updated = current;
            if !update_fn(&mut updated) {
                return Ok(None);
            }
            let new_json = serde_json::to_string(&updated)?;

            // Guard on the raw stored string, not a re-serialization, so
            // the compare is byte-exact.
            match self
                .store
                .compare_and_swap(&key, Some(&current_json), &new_json)
                .await
            {
                Ok(()) => return Ok(Some(updated)),
                Err(StoreError::CompareAndSwapFailed { .. }) => {
                    attempt += 1;
                    if attempt >= MAX_CAS_RETRIES {
                        bail!("station update CAS failed after {} attempts (max retries exceeded)", attempt);
                    }
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(CAS_RETRY_MAX_BACKOFF_MS);
                }
                Err(e) => bail!("station update CAS failed: {}", e),
            }
        }
    }

    /// Read a record with its raw stored JSON, for byte-exact CAS guards.
    async fn read_raw(&self, key: &str) -> Result<Option<(String, Station)>> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(json) => {
                let station = parse_station(&json)?;
                Ok(Some((json, station)))
            }
        }
    }
}

fn parse_station(value: &str) -> Result<Station> {
    serde_json::from_str(value).with_context(|| format!("corrupted station record: {value:?}"))
}
