//! The waiting line: strict arrival order over the store's native list.
//!
//! The list at [`crate::keys::waiting_key`] is the single source of truth
//! for line order. Entries are appended at the tail and served from the
//! head; targeted removal preserves the relative order of everything else.
//! Positions are always derived from the current order at read time.

mod ops;

use std::sync::Arc;

use lobby_core::ListStore;

/// Ordered access to the shared waiting line.
pub struct WaitingLine<S: ListStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ListStore + ?Sized + 'static> WaitingLine<S> {
    /// Create a waiting line over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[cfg(test)]
mod tests {
    use lobby_core::DeterministicListStore;

    use super::*;

    #[tokio::test]
    async fn enqueue_rejects_blank_names() {
        let line = WaitingLine::new(DeterministicListStore::new());
        assert!(line.enqueue("").await.unwrap().is_none());
        assert!(line.enqueue("   ").await.unwrap().is_none());
        assert!(line.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enqueue_returns_position_hint() {
        let line = WaitingLine::new(DeterministicListStore::new());
        let alice = line.enqueue("Alice").await.unwrap().unwrap();
        let bob = line.enqueue("Bob").await.unwrap().unwrap();
        assert_eq!(alice.position, 1);
        assert_eq!(bob.position, 2);
        assert_ne!(alice.id, bob.id);
    }

    #[tokio::test]
    async fn dequeue_preserves_arrival_order() {
        let line = WaitingLine::new(DeterministicListStore::new());
        for name in ["Alice", "Bob", "Carol"] {
            line.enqueue(name).await.unwrap().unwrap();
        }
        let names: Vec<String> = [
            line.dequeue_front().await.unwrap().unwrap(),
            line.dequeue_front().await.unwrap().unwrap(),
            line.dequeue_front().await.unwrap().unwrap(),
        ]
        .into_iter()
        .map(|entry| entry.name)
        .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert!(line.dequeue_front().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_by_id_keeps_relative_order() {
        let line = WaitingLine::new(DeterministicListStore::new());
        line.enqueue("Alice").await.unwrap().unwrap();
        let bob = line.enqueue("Bob").await.unwrap().unwrap();
        line.enqueue("Carol").await.unwrap().unwrap();

        let removed = line.remove_by_id(&bob.id).await.unwrap().unwrap();
        assert_eq!(removed.name, "Bob");

        let names: Vec<String> = line
            .snapshot()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Carol"]);
    }

    #[tokio::test]
    async fn remove_by_id_unknown_is_none() {
        let line = WaitingLine::new(DeterministicListStore::new());
        line.enqueue("Alice").await.unwrap().unwrap();
        assert!(line.remove_by_id("e-missing").await.unwrap().is_none());
        assert_eq!(line.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn snapshot_positions_are_sequential() {
        let line = WaitingLine::new(DeterministicListStore::new());
        for name in ["Alice", "Bob", "Carol", "Dave"] {
            line.enqueue(name).await.unwrap().unwrap();
        }
        let second = line.snapshot().await.unwrap()[1].clone();
        line.remove_by_id(&second.id).await.unwrap().unwrap();

        let snapshot = line.snapshot().await.unwrap();
        for (index, entry) in snapshot.iter().enumerate() {
            assert_eq!(entry.position, index as u32 + 1);
        }
    }

    #[tokio::test]
    async fn prepend_puts_entry_at_head() {
        let line = WaitingLine::new(DeterministicListStore::new());
        line.enqueue("Eve").await.unwrap().unwrap();
        let dave = line.enqueue("Dave").await.unwrap().unwrap();
        let dave = line.remove_by_id(&dave.id).await.unwrap().unwrap();

        line.prepend_front(&dave).await.unwrap();
        let snapshot = line.snapshot().await.unwrap();
        assert_eq!(snapshot[0].name, "Dave");
        assert_eq!(snapshot[0].position, 1);
        assert_eq!(snapshot[1].name, "Eve");
        assert_eq!(snapshot[1].position, 2);
    }

    #[tokio::test]
    async fn position_of_tracks_current_order() {
        let line = WaitingLine::new(DeterministicListStore::new());
        let alice = line.enqueue("Alice").await.unwrap().unwrap();
        let bob = line.enqueue("Bob").await.unwrap().unwrap();

        assert_eq!(line.position_of(&bob.id).await.unwrap(), Some(2));
        line.remove_by_id(&alice.id).await.unwrap().unwrap();
        assert_eq!(line.position_of(&bob.id).await.unwrap(), Some(1));
        assert_eq!(line.position_of(&alice.id).await.unwrap(), None);
    }
}
