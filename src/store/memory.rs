//! Process-lifetime topic store guarded by a single mutex.

use crate::store::types::{NewTopic, StoreError, Topic, seed_topics};
use std::sync::{Mutex, MutexGuard};

/// Abstraction over topic storage used by the HTTP surface.
///
/// Every method completes its read or read-modify-write before returning, so callers never
/// observe a half-applied mutation.
pub trait TopicStore: Send + Sync {
    /// Return every topic in creation order.
    fn list(&self) -> Result<Vec<Topic>, StoreError>;

    /// Look up a topic by identifier.
    fn get(&self, id: u64) -> Result<Option<Topic>, StoreError>;

    /// Append a new, incomplete topic and return it with its assigned identifier.
    fn create(&self, input: NewTopic) -> Result<Topic, StoreError>;

    /// Mark a topic complete, returning the updated record or `None` when the id is unknown.
    fn complete(&self, id: u64) -> Result<Option<Topic>, StoreError>;
}

/// Vector-backed [`TopicStore`] with a monotonically increasing id counter.
///
/// The counter lives under the same lock as the records, so id allocation and the append are
/// one atomic step and an id is never handed out twice.
pub struct InMemoryTopicStore {
    inner: Mutex<Inner>,
}

struct Inner {
    topics: Vec<Topic>,
    next_id: u64,
}

impl InMemoryTopicStore {
    /// Create an empty store whose first topic receives id 1.
    pub fn new() -> Self {
        Self::with_topics(Vec::new())
    }

    /// Create a store holding the three default learning topics.
    pub fn seeded() -> Self {
        Self::with_topics(seed_topics())
    }

    /// Create a store from existing records. New ids continue after the highest id present.
    pub fn with_topics(topics: Vec<Topic>) -> Self {
        let next_id = topics.iter().map(|topic| topic.id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(Inner { topics, next_id }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for InMemoryTopicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicStore for InMemoryTopicStore {
    fn list(&self) -> Result<Vec<Topic>, StoreError> {
        Ok(self.lock()?.topics.clone())
    }

    fn get(&self, id: u64) -> Result<Option<Topic>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.topics.iter().find(|topic| topic.id == id).cloned())
    }

    fn create(&self, input: NewTopic) -> Result<Topic, StoreError> {
        let mut inner = self.lock()?;
        let topic = Topic {
            id: inner.next_id,
            title: input.title,
            description: input.description,
            completed: false,
        };
        inner.next_id += 1;
        inner.topics.push(topic.clone());
        Ok(topic)
    }

    fn complete(&self, id: u64) -> Result<Option<Topic>, StoreError> {
        let mut inner = self.lock()?;
        Ok(inner
            .topics
            .iter_mut()
            .find(|topic| topic.id == id)
            .map(|topic| {
                topic.completed = true;
                topic.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_topic(title: &str) -> NewTopic {
        NewTopic::new(title, "description").expect("valid input")
    }

    #[test]
    fn seeded_store_lists_defaults_in_order() {
        let store = InMemoryTopicStore::seeded();
        let topics = store.list().expect("list");
        let titles: Vec<&str> = topics.iter().map(|topic| topic.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["JavaScript Basics", "Node.js Introduction", "DevOps Fundamentals"]
        );
        assert!(topics[2].completed);
    }

    #[test]
    fn create_continues_after_seeded_ids() {
        let store = InMemoryTopicStore::seeded();
        let topic = store.create(new_topic("Rust")).expect("create");
        assert_eq!(topic.id, 4);
        assert!(!topic.completed);
        assert_eq!(store.list().expect("list").len(), 4);
        assert_eq!(store.get(4).expect("get"), Some(topic));
    }

    #[test]
    fn empty_store_starts_at_one() {
        let store = InMemoryTopicStore::new();
        assert!(store.list().expect("list").is_empty());
        assert_eq!(store.create(new_topic("first")).expect("create").id, 1);
        assert_eq!(store.create(new_topic("second")).expect("create").id, 2);
    }

    #[test]
    fn ids_skip_gaps_in_initial_records() {
        let store = InMemoryTopicStore::with_topics(vec![Topic {
            id: 10,
            title: "Gap".into(),
            description: "Sparse ids".into(),
            completed: false,
        }]);
        assert_eq!(store.create(new_topic("next")).expect("create").id, 11);
    }

    #[test]
    fn get_unknown_id_is_none() {
        let store = InMemoryTopicStore::seeded();
        assert_eq!(store.get(999).expect("get"), None);
    }

    #[test]
    fn complete_is_idempotent() {
        let store = InMemoryTopicStore::seeded();
        let first = store.complete(1).expect("complete").expect("topic 1");
        assert!(first.completed);
        let second = store.complete(1).expect("complete").expect("topic 1");
        assert_eq!(first, second);
        assert!(store.get(1).expect("get").expect("topic 1").completed);
    }

    #[test]
    fn complete_unknown_id_is_none() {
        let store = InMemoryTopicStore::seeded();
        assert_eq!(store.complete(999).expect("complete"), None);
    }

    #[test]
    fn concurrent_creates_receive_distinct_ids() {
        let store = Arc::new(InMemoryTopicStore::seeded());
        let handles: Vec<_> = (0..16)
            .map(|idx| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .create(new_topic(&format!("topic-{idx}")))
                        .expect("create")
                        .id
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(ids.first(), Some(&4));
        assert_eq!(ids.last(), Some(&19));
    }

    #[test]
    fn poisoned_lock_surfaces_as_error() {
        let store = Arc::new(InMemoryTopicStore::seeded());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().expect("lock");
            panic!("poison the store");
        })
        .join();

        assert!(matches!(store.list(), Err(StoreError::Poisoned)));
    }
}
