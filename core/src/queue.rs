//! The waiting queue.
//!
//! One global FIFO of users waiting for any spot to free up. The queue does
//! no duplicate suppression of its own; the reducer only enqueues users that
//! hold nothing and are not already waiting.

use crate::types::UserName;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// FIFO of waiting users, head first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitingQueue {
    entries: VecDeque<UserName>,
}

impl WaitingQueue {
    /// Create an empty queue
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append `user_name` and return its 1-based position
    pub fn enqueue(&mut self, user_name: UserName) -> usize {
        self.entries.push_back(user_name);
        self.entries.len()
    }

    /// Pop the head of the queue
    pub fn dequeue_next(&mut self) -> Option<UserName> {
        self.entries.pop_front()
    }

    /// 1-based position of `user_name`, if waiting
    #[must_use]
    pub fn position(&self, user_name: &UserName) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry == user_name)
            .map(|index| index + 1)
    }

    /// Remove every entry for `user_name`; returns whether anything was removed
    pub fn remove(&mut self, user_name: &UserName) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != user_name);
        self.entries.len() != before
    }

    /// Copy of the queue, head first
    #[must_use]
    pub fn snapshot(&self) -> Vec<UserName> {
        self.entries.iter().cloned().collect()
    }

    /// Number of waiting users
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
