//! Record types and error definitions for the topic store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A learning subject tracked by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Positive identifier, unique for the lifetime of the store.
    pub id: u64,
    /// Short human-readable name.
    pub title: String,
    /// Longer explanation of what the topic covers.
    pub description: String,
    /// Whether the topic has been marked complete. Only ever flips from `false` to `true`.
    pub completed: bool,
}

/// Validated input for creating a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    /// Title of the new topic.
    pub title: String,
    /// Description of the new topic.
    pub description: String,
}

impl NewTopic {
    /// Build creation input, returning `None` unless both fields are non-empty.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Option<Self> {
        let title = title.into();
        let description = description.into();
        if title.is_empty() || description.is_empty() {
            return None;
        }
        Some(Self { title, description })
    }
}

/// Errors surfaced by [`crate::store::TopicStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the store lock.
    #[error("topic store lock poisoned")]
    Poisoned,
}

pub(crate) fn seed_topics() -> Vec<Topic> {
    [
        (
            1,
            "JavaScript Basics",
            "Learn the fundamentals of JavaScript",
            false,
        ),
        (
            2,
            "Node.js Introduction",
            "Getting started with Node.js",
            false,
        ),
        (
            3,
            "DevOps Fundamentals",
            "Understanding DevOps practices",
            true,
        ),
    ]
    .into_iter()
    .map(|(id, title, description, completed)| Topic {
        id,
        title: title.to_string(),
        description: description.to_string(),
        completed,
    })
    .collect()
}
