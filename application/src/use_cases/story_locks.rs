//! Per-story mutual exclusion
//!
//! A vote submission reads the team size and the round's vote count, writes
//! the vote and maybe advances the round. Those steps must not interleave
//! with another submission on the same story, or two "last" voters could
//! both advance the round (or both miss each other and stall it). Stories
//! are independent, so each one gets its own lock.

use poker_domain::StoryId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Keyed async locks, one per story
#[derive(Default)]
pub struct StoryLocks {
    locks: Mutex<HashMap<StoryId, Arc<tokio::sync::Mutex<()>>>>,
}

impl StoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `story`.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn lock(&self, story: StoryId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(story).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop locks nobody is holding or waiting on
    pub fn prune(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of stories with a lock entry
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_story_is_exclusive() {
        let locks = StoryLocks::new();
        let guard = locks.lock(StoryId::new(1)).await;

        let second = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            locks.lock(StoryId::new(1)),
        )
        .await;
        assert!(second.is_err(), "second lock on the same story must wait");

        drop(guard);
        let _again = locks.lock(StoryId::new(1)).await;
    }

    #[tokio::test]
    async fn test_different_stories_do_not_contend() {
        let locks = StoryLocks::new();
        let _a = locks.lock(StoryId::new(1)).await;
        let _b = locks.lock(StoryId::new(2)).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = StoryLocks::new();
        let held = locks.lock(StoryId::new(1)).await;
        drop(locks.lock(StoryId::new(2)).await);

        locks.prune();
        assert_eq!(locks.len(), 1);

        drop(held);
        locks.prune();
        assert!(locks.is_empty());
    }
}
