//! Deterministic in-memory store for tests and local mode.
//!
//! This is the single-process counterpart of the remote backend: the same
//! [`ListStore`] contract over a `BTreeMap` guarded by one `RwLock`, so
//! every primitive is individually atomic exactly as the remote store's
//! primitives are. Behavior is fully deterministic, which is what the unit
//! and scenario tests are written against.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::traits::ListStore;

/// A stored value: a scalar string or an ordered list of strings.
#[derive(Debug, Clone)]
enum Slot {
    Scalar(String),
    List(VecDeque<String>),
}

impl Slot {
    fn kind(&self) -> &'static str {
        match self {
            Slot::Scalar(_) => "scalar",
            Slot::List(_) => "list",
        }
    }
}

/// A deterministic in-memory store.
///
/// Thread-safe and supporting all [`ListStore`] operations with
/// predictable behavior for testing.
pub struct DeterministicListStore {
    data: RwLock<BTreeMap<String, Slot>>,
}

impl Default for DeterministicListStore {
    fn default() -> Self {
        Self::new_inner()
    }
}

impl DeterministicListStore {
    /// Create a new deterministic store wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::new_inner())
    }

    fn new_inner() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, slot: &Slot) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
        actual: slot.kind(),
    }
}

/// Resolve a `[start, stop]` range with tail-relative negatives against a
/// list of `len` elements. Returns an inclusive 0-based window, or `None`
/// when the range selects nothing.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start >= len || stop < start {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl ListStore for DeterministicListStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.read().await;
        match data.get(key) {
            None => Ok(None),
            Some(Slot::Scalar(value)) => Ok(Some(value.clone())),
            Some(slot) => Err(wrong_type(key, "scalar", slot)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), Slot::Scalar(value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        Ok(data.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let data = self.data.read().await;
        Ok(data.contains_key(key))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        let data = self.data.read().await;
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            match data.get(key) {
                None => values.push(None),
                Some(Slot::Scalar(value)) => values.push(Some(value.clone())),
                Some(slot) => return Err(wrong_type(key, "scalar", slot)),
            }
        }
        Ok(values)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let current = match data.get(key) {
            None => None,
            Some(Slot::Scalar(value)) => Some(value.clone()),
            Some(slot) => return Err(wrong_type(key, "scalar", slot)),
        };
        if current.as_deref() == expected {
            data.insert(key.to_string(), Slot::Scalar(new_value.to_string()));
            Ok(())
        } else {
            Err(StoreError::CompareAndSwapFailed {
                key: key.to_string(),
                expected: expected.map(str::to_string),
                actual: current,
            })
        }
    }

    async fn list_append(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        match data
            .entry(key.to_string())
            .or_insert_with(|| Slot::List(VecDeque::new()))
        {
            Slot::List(list) => {
                list.push_back(value.to_string());
                Ok(list.len() as u64)
            }
            slot => Err(wrong_type(key, "list", slot)),
        }
    }

    async fn list_pop_front(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut data = self.data.write().await;
        let (popped, now_empty) = match data.get_mut(key) {
            None => return Ok(None),
            Some(Slot::List(list)) => {
                let popped = list.pop_front();
                (popped, list.is_empty())
            }
            Some(slot) => return Err(wrong_type(key, "list", slot)),
        };
        if now_empty {
            data.remove(key);
        }
        Ok(popped)
    }

    async fn list_push_front(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        match data
            .entry(key.to_string())
            .or_insert_with(|| Slot::List(VecDeque::new()))
        {
            Slot::List(list) => {
                list.push_front(value.to_string());
                Ok(list.len() as u64)
            }
            slot => Err(wrong_type(key, "list", slot)),
        }
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let data = self.data.read().await;
        match data.get(key) {
            None => Ok(vec![]),
            Some(Slot::List(list)) => match resolve_range(list.len(), start, stop) {
                None => Ok(vec![]),
                Some((from, to)) => Ok(list.iter().skip(from).take(to - from + 1).cloned().collect()),
            },
            Some(slot) => Err(wrong_type(key, "list", slot)),
        }
    }

    async fn list_set_at(&self, key: &str, index: u64, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        match data.get_mut(key) {
            None => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            Some(Slot::List(list)) => match list.get_mut(index as usize) {
                Some(slot) => {
                    *slot = value.to_string();
                    Ok(())
                }
                None => Err(StoreError::IndexOutOfRange {
                    key: key.to_string(),
                    index,
                }),
            },
            Some(slot) => Err(wrong_type(key, "list", slot)),
        }
    }

    async fn list_remove_matching(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let (removed, now_empty) = match data.get_mut(key) {
            None => return Ok(0),
            Some(Slot::List(list)) => {
                let before = list.len();
                list.retain(|element| element != value);
                ((before - list.len()) as u64, list.is_empty())
            }
            Some(slot) => return Err(wrong_type(key, "list", slot)),
        };
        if now_empty {
            data.remove(key);
        }
        Ok(removed)
    }
}
