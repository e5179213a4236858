//! Waiting-line operations.

use anyhow::Context as _;
use anyhow::Result;
use lobby_core::ListStore;
use lobby_core::MAX_DISPLAY_NAME_SIZE;
use lobby_core::MAX_LIST_SCAN;
use tracing::debug;
use tracing::warn;

use super::WaitingLine;
use crate::keys;
use crate::types::Entry;
use crate::types::now_unix_ms;

impl<S: ListStore + ?Sized + 'static> WaitingLine<S> {
    /// Append a new entry at the tail of the line.
    ///
    /// Returns `None` without touching the store when the name is blank or
    /// oversized. The returned `position` is the list length at the moment
    /// of the append: an immediate-feedback hint, not an authoritative
    /// rank (see [`WaitingLine::snapshot`]).
    pub async fn enqueue(&self, name: &str) -> Result<Option<Entry>> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_DISPLAY_NAME_SIZE as usize {
            debug!(name_len = name.len(), "join rejected: invalid name");
            return Ok(None);
        }

        let joined_at_ms = now_unix_ms();
        let mut entry = Entry::new(
            keys::entry_token(joined_at_ms, rand::random::<u64>()),
            name.to_string(),
            joined_at_ms,
        );
        let json = serde_json::to_string(&entry)?;
        let length = self.store.list_append(&keys::waiting_key(), &json).await?;
        entry.position = length as u32;

        debug!(entry_id = %entry.id, position = entry.position, "entry joined the line");
        Ok(Some(entry))
    }

    /// Remove and return the head of the line. `None` when the line is
    /// empty.
    pub async fn dequeue_front(&self) -> Result<Option<Entry>> {
        let key = keys::waiting_key();
        loop {
            let Some(value) = self.store.list_pop_front(&key).await? else {
                return Ok(None);
            };
            // A tombstone at the head means a targeted removal is mid-flight
            // on that slot; it is not a live entry.
            if value.starts_with(keys::TOMBSTONE_PREFIX) {
                continue;
            }
            let mut entry = parse_entry(&value)?;
            entry.position = 0;
            debug!(entry_id = %entry.id, "entry dequeued from the head");
            return Ok(Some(entry));
        }
    }

    /// Remove the entry with the given id wherever it sits in the line,
    /// preserving the relative order of all other entries. `None` when the
    /// id is not in the line.
    ///
    /// The store's list type has no delete-at-index, only index overwrite
    /// and remove-all-matching-value, so the slot is first overwritten with
    /// a tombstone carrying a fresh random token, then all elements
    /// matching that tombstone are removed. The token is unique per call;
    /// a fixed value could collide with a concurrent removal.
    pub async fn remove_by_id(&self, entry_id: &str) -> Result<Option<Entry>> {
        let key = keys::waiting_key();
        let values = self.store.list_range(&key, 0, MAX_LIST_SCAN as i64 - 1).await?;

        let mut found: Option<(u64, Entry)> = None;
        for (index, value) in values.iter().enumerate() {
            if value.starts_with(keys::TOMBSTONE_PREFIX) {
                continue;
            }
            let entry = parse_entry(value)?;
            if entry.id == entry_id {
                found = Some((index as u64, entry));
                break;
            }
        }
        let Some((index, mut entry)) = found else {
            return Ok(None);
        };

        let tombstone = keys::removal_tombstone(entry_id, rand::random::<u64>());
        // The window between the range read and this overwrite is the
        // documented hazard of value-based removal: a concurrent head pop
        // shifts indices left. An out-of-range result means the list
        // changed under us and the entry is treated as already gone.
        match self.store.list_set_at(&key, index, &tombstone).await {
            Ok(()) => {}
            Err(lobby_core::StoreError::IndexOutOfRange { .. })
            | Err(lobby_core::StoreError::NotFound { .. }) => {
                debug!(entry_id, index, "line changed during removal, treating as gone");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let removed = self.store.list_remove_matching(&key, &tombstone).await?;
        if removed == 0 {
            warn!(entry_id, "removal tombstone vanished before cleanup");
        }

        entry.position = 0;
        debug!(entry_id = %entry.id, "entry removed from the line");
        Ok(Some(entry))
    }

    /// Insert an entry at the head of the line. Every previously-waiting
    /// entry shifts back by one.
    pub async fn prepend_front(&self, entry: &Entry) -> Result<()> {
        let mut entry = entry.clone();
        entry.position = 0;
        let json = serde_json::to_string(&entry)?;
        self.store.list_push_front(&keys::waiting_key(), &json).await?;
        debug!(entry_id = %entry.id, "entry returned to the head of the line");
        Ok(())
    }

    /// Materialize the current line in order, with `position` computed as
    /// index + 1 for every element. Each call produces a fresh list;
    /// callers re-snapshot rather than holding on to one.
    pub async fn snapshot(&self) -> Result<Vec<Entry>> {
        let values = self
            .store
            .list_range(&keys::waiting_key(), 0, MAX_LIST_SCAN as i64 - 1)
            .await?;

        let mut entries = Vec::with_capacity(values.len());
        for value in &values {
            if value.starts_with(keys::TOMBSTONE_PREFIX) {
                continue;
            }
            let mut entry = parse_entry(value)?;
            entry.position = entries.len() as u32 + 1;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Current 1-based position of an entry, or `None` when it is not in
    /// the line (already in service, finished, or never joined).
    pub async fn position_of(&self, entry_id: &str) -> Result<Option<u32>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .into_iter()
            .find(|entry| entry.id == entry_id)
            .map(|entry| entry.position))
    }
}

fn parse_entry(value: &str) -> Result<Entry> {
    serde_json::from_str(value).with_context(|| format!("corrupted waiting-line entry: {value:?}"))
}
