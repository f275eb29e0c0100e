//! Persisted Command Queue
//!
//! An ordered list of pending user-issued commands, mirrored to the
//! `commandQueue` storage slot after every mutation. The queue never
//! originates, reorders or deduplicates entries; it only holds and persists
//! what callers put in it.

use crate::observable::Observable;
use crate::storage::LocalStorage;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::watch;

/// Storage slot holding the serialized queue
pub const COMMAND_QUEUE_KEY: &str = "commandQueue";

/// Persisted, observable list of command entries
#[derive(Debug)]
pub struct CommandQueue<T = serde_json::Value> {
    entries: Observable<Vec<T>>,
    storage: LocalStorage,
}

impl<T> CommandQueue<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Initialize from storage. Missing, malformed or unavailable storage
    /// all start the queue empty.
    pub fn load(storage: LocalStorage) -> Self {
        let initial: Vec<T> = storage.read_json(COMMAND_QUEUE_KEY).unwrap_or_default();

        tracing::debug!(
            entries = initial.len(),
            persistent = storage.is_available(),
            "Command queue loaded"
        );

        Self {
            entries: Observable::new(initial),
            storage,
        }
    }

    /// Current entries, in insertion order
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.get()
    }

    pub fn len(&self) -> usize {
        self.entries.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole queue
    pub fn set(&self, entries: Vec<T>) {
        self.entries.set(entries);
        self.persist();
    }

    /// Mutate the queue in place
    pub fn update(&self, f: impl FnOnce(&mut Vec<T>)) {
        self.entries.update(f);
        self.persist();
    }

    /// Append an entry at the end
    pub fn push(&self, entry: T) {
        self.update(|entries| entries.push(entry));
    }

    /// Remove the entry at `index`. Out of range leaves the queue untouched.
    ///
    /// The bounds check and the removal happen under the same write lock, so
    /// concurrent callers racing for the last entry never panic.
    pub fn remove(&self, index: usize) -> Option<T> {
        let mut removed = None;
        self.entries.update_if(|entries| {
            if index < entries.len() {
                removed = Some(entries.remove(index));
            }
            removed.is_some()
        });
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.set(Vec::new());
    }

    /// Observe every new snapshot of the queue
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.entries.subscribe()
    }

    fn persist(&self) {
        self.entries
            .with(|entries| self.storage.write_json(COMMAND_QUEUE_KEY, entries));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Command {
        action: String,
        target: u32,
    }

    fn cmd(action: &str, target: u32) -> Command {
        Command {
            action: action.to_string(),
            target,
        }
    }

    #[test]
    fn test_starts_empty() {
        let queue: CommandQueue = CommandQueue::load(LocalStorage::memory());
        assert!(queue.is_empty());
        assert_eq!(queue.snapshot(), Vec::<serde_json::Value>::new());
    }

    #[test]
    fn test_round_trip_through_fresh_load() {
        let storage = LocalStorage::memory();
        let entries = vec![
            json!({"action": "create_mailbox", "user": "jdoe"}),
            json!("plain string entry"),
            json!([1, 2, 3]),
        ];

        let queue: CommandQueue = CommandQueue::load(storage.clone());
        queue.set(entries.clone());

        let reloaded: CommandQueue = CommandQueue::load(storage);
        assert_eq!(reloaded.snapshot(), entries);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = LocalStorage::memory();
        let queue = CommandQueue::load(storage.clone());

        queue.push(cmd("reset_password", 1));
        queue.push(cmd("assign_license", 2));
        queue.push(cmd("disable_account", 3));
        assert_eq!(
            storage.read_json::<Vec<Command>>(COMMAND_QUEUE_KEY).unwrap(),
            queue.snapshot()
        );

        assert_eq!(queue.remove(1), Some(cmd("assign_license", 2)));
        assert_eq!(
            storage.read_json::<Vec<Command>>(COMMAND_QUEUE_KEY).unwrap(),
            vec![cmd("reset_password", 1), cmd("disable_account", 3)]
        );

        queue.clear();
        assert_eq!(
            storage.read_json::<Vec<Command>>(COMMAND_QUEUE_KEY).unwrap(),
            Vec::<Command>::new()
        );
    }

    #[test]
    fn test_keeps_duplicates_in_insertion_order() {
        let queue = CommandQueue::load(LocalStorage::memory());
        queue.push(cmd("sync", 1));
        queue.push(cmd("sync", 1));
        queue.push(cmd("noop", 0));

        assert_eq!(
            queue.snapshot(),
            vec![cmd("sync", 1), cmd("sync", 1), cmd("noop", 0)]
        );
    }

    #[test]
    fn test_remove_out_of_range() {
        let queue = CommandQueue::load(LocalStorage::memory());
        queue.push(cmd("sync", 1));

        assert_eq!(queue.remove(5), None);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_concurrent_remove_of_last_entry() {
        let storage = LocalStorage::memory();
        let queue = Arc::new(CommandQueue::load(storage.clone()));

        for round in 0..500 {
            queue.push(cmd("sync", round));
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        queue.remove(0)
                    })
                })
                .collect();

            let removed: Vec<_> = handles
                .into_iter()
                .flat_map(|h| h.join().expect("remove must not panic"))
                .collect();

            assert_eq!(removed, vec![cmd("sync", round)]);
            assert!(queue.is_empty());
        }

        assert_eq!(
            storage.read_json::<Vec<Command>>(COMMAND_QUEUE_KEY),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_out_of_range_remove_does_not_notify() {
        let queue = CommandQueue::load(LocalStorage::memory());
        queue.push(cmd("sync", 1));
        let rx = queue.subscribe();

        assert_eq!(queue.remove(3), None);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_malformed_slot_starts_empty() {
        let storage = LocalStorage::memory();
        storage.set_item(COMMAND_QUEUE_KEY, "{not a list");

        let queue: CommandQueue = CommandQueue::load(storage);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wrong_shape_starts_empty() {
        let storage = LocalStorage::memory();
        storage.set_item(COMMAND_QUEUE_KEY, r#"{"action": "sync"}"#);

        let queue: CommandQueue<Command> = CommandQueue::load(storage);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_without_storage() {
        let queue = CommandQueue::load(LocalStorage::unavailable());
        assert!(queue.is_empty());

        queue.push(cmd("sync", 1));
        assert_eq!(queue.snapshot(), vec![cmd("sync", 1)]);
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempdir().unwrap();

        let queue = CommandQueue::load(LocalStorage::in_dir(dir.path()));
        queue.push(cmd("create_mailbox", 10));
        queue.push(cmd("grant_access", 11));
        drop(queue);

        let reloaded: CommandQueue<Command> = CommandQueue::load(LocalStorage::in_dir(dir.path()));
        assert_eq!(
            reloaded.snapshot(),
            vec![cmd("create_mailbox", 10), cmd("grant_access", 11)]
        );
    }

    #[tokio::test]
    async fn test_subscribers_observe_updates() {
        let queue = CommandQueue::load(LocalStorage::memory());
        let mut rx = queue.subscribe();

        queue.push(cmd("sync", 1));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        queue.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }
}
