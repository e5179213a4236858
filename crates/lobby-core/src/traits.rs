//! The store contract consumed by the coordination layer.
//!
//! Every backend (the deterministic in-memory store used in tests, the
//! Redis adapter used in production) implements [`ListStore`]. The
//! coordination layer is written purely against this trait, so backends are
//! selected by construction, not by conditional code paths.
//!
//! Atomicity guarantee: each method is individually atomic in the backend.
//! There is no multi-operation transaction; callers that need
//! read-modify-write safety go through [`ListStore::compare_and_swap`].

use async_trait::async_trait;

use crate::error::StoreError;

/// Key-value store with native ordered-list values.
///
/// Scalar keys hold a single string. List keys hold an ordered sequence of
/// strings with head/tail access, range reads, index overwrite, and
/// value-based removal: the primitive set of a Redis-style store.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Read a scalar value. `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a scalar value, creating or overwriting the key.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key of any shape. Returns whether it existed (idempotent).
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Check whether a key exists, without reading its value.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Read several scalar keys in one round trip, preserving order.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// Atomically set `key` to `new_value` iff its current value equals
    /// `expected`. `expected == None` means "create only if absent".
    ///
    /// Fails with [`StoreError::CompareAndSwapFailed`] when the guard does
    /// not match; callers treat that as a retryable conflict.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> Result<(), StoreError>;

    /// Append a value to the tail of a list, creating the list if absent.
    /// Returns the new list length.
    async fn list_append(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Remove and return the head of a list. `None` when the list is empty
    /// or absent.
    async fn list_pop_front(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert a value at the head of a list, creating the list if absent.
    /// Returns the new list length.
    async fn list_push_front(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Read the inclusive range `[start, stop]` of a list. Negative indices
    /// count from the tail (`-1` is the last element). An absent list reads
    /// as empty.
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;

    /// Overwrite the element at `index` (0-based from the head).
    ///
    /// Fails with [`StoreError::IndexOutOfRange`] when the list is shorter
    /// than `index + 1`, and [`StoreError::NotFound`] when it is absent.
    async fn list_set_at(&self, key: &str, index: u64, value: &str) -> Result<(), StoreError>;

    /// Remove every element equal to `value`, preserving the relative order
    /// of the rest. Returns the number of elements removed.
    async fn list_remove_matching(&self, key: &str, value: &str) -> Result<u64, StoreError>;
}

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: ListStore + ?Sized> ListStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        (**self).get_many(keys).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> Result<(), StoreError> {
        (**self).compare_and_swap(key, expected, new_value).await
    }

    async fn list_append(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        (**self).list_append(key, value).await
    }

    async fn list_pop_front(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).list_pop_front(key).await
    }

    async fn list_push_front(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        (**self).list_push_front(key, value).await
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        (**self).list_range(key, start, stop).await
    }

    async fn list_set_at(&self, key: &str, index: u64, value: &str) -> Result<(), StoreError> {
        (**self).list_set_at(key, index, value).await
    }

    async fn list_remove_matching(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        (**self).list_remove_matching(key, value).await
    }
}
