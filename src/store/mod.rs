//! Topic records and the in-memory store that owns them.

mod memory;
pub mod types;

pub use memory::{InMemoryTopicStore, TopicStore};
pub use types::{NewTopic, StoreError, Topic};
