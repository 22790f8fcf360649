//! JSON snapshot of the store contents
//!
//! The whole [`StoreState`] is written as one pretty-printed JSON document.
//! Writes go to a sibling temp file first and are renamed over the target,
//! so a crash mid-write leaves the previous snapshot intact.
//!
//! Each process loads the snapshot, works on it in memory and saves it back.
//! Processes sharing a store coordinate through an advisory lock on the
//! sibling `<store>.lock` file: a writer holds it exclusively from before
//! `load` until after `save`, readers share it.

use super::state::StoreState;
use fd_lock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use poker_application::StoreError;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Snapshot file of an [`InMemoryEstimationStore`](super::InMemoryEstimationStore)
pub struct JsonSnapshot {
    path: PathBuf,
}

impl JsonSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the lock file guarding this snapshot, creating it if needed.
    ///
    /// Opening does not lock anything; call [`SnapshotLock::write`] or
    /// [`SnapshotLock::read`].
    pub fn lock(&self) -> Result<SnapshotLock, StoreError> {
        self.create_parent()?;
        let path = self.sibling(".lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| io_error(&path, e))?;
        Ok(SnapshotLock {
            path,
            lock: RwLock::new(file),
        })
    }

    /// Read the snapshot. A missing file is an empty store.
    pub fn load(&self) -> Result<StoreState, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No snapshot at {}, starting with an empty store",
                    self.path.display()
                );
                return Ok(StoreState::default());
            }
            Err(e) => return Err(io_error(&self.path, e)),
        };

        let state: StoreState = serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupt(format!("{}: {}", self.path.display(), e))
        })?;
        state.check()?;

        debug!(
            "Loaded snapshot {} ({} tasks, {} stories, {} votes)",
            self.path.display(),
            state.tasks.len(),
            state.stories.len(),
            state.votes.len()
        );
        Ok(state)
    }

    /// Replace the snapshot with `state`
    pub fn save(&self, state: &StoreState) -> Result<(), StoreError> {
        self.create_parent()?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Corrupt(format!("cannot serialize store: {}", e)))?;

        let tmp = self.sibling(".tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
            file.write_all(json.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|e| io_error(&tmp, e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;

        debug!("Saved snapshot {}", self.path.display());
        Ok(())
    }

    fn create_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))
            }
            _ => Ok(()),
        }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

/// Advisory lock shared by every process that opens the same store
pub struct SnapshotLock {
    path: PathBuf,
    lock: RwLock<File>,
}

impl SnapshotLock {
    /// Block until no other process holds the lock, then hold it alone.
    ///
    /// Hold the guard across `load`, the changes and `save`.
    pub fn write(&mut self) -> Result<RwLockWriteGuard<'_, File>, StoreError> {
        debug!("Waiting for write lock {}", self.path.display());
        let path = &self.path;
        self.lock.write().map_err(|e| io_error(path, e))
    }

    /// Block until no writer holds the lock
    pub fn read(&self) -> Result<RwLockReadGuard<'_, File>, StoreError> {
        self.lock.read().map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEstimationStore;
    use poker_application::{
        CatalogUseCase, EstimationStore, SubmitVoteInput, SubmitVoteUseCase,
    };
    use poker_domain::{Iteration, StoryId, UserId};
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = JsonSnapshot::new(dir.path().join("none.json"));
        assert_eq!(snapshot.load().unwrap(), StoreState::default());
    }

    #[tokio::test]
    async fn test_save_and_reload_seeded_store() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = JsonSnapshot::new(dir.path().join("nested").join("state.json"));

        let store = Arc::new(InMemoryEstimationStore::new());
        CatalogUseCase::new(Arc::clone(&store))
            .seed_demo()
            .await
            .unwrap();
        let state = store.snapshot().await;
        snapshot.save(&state).unwrap();

        let reloaded = snapshot.load().unwrap();
        assert_eq!(reloaded, state);
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());

        let store = InMemoryEstimationStore::from_state(reloaded);
        let team = store
            .team_members(poker_domain::TaskId::new(2))
            .await
            .unwrap();
        assert_eq!(team.len(), 2);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonSnapshot::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = JsonSnapshot::new(dir.path().join("state.json"));
        snapshot.save(&StoreState::default()).unwrap();

        let mut state = StoreState::default();
        state.last_ids.user = 7;
        snapshot.save(&state).unwrap();
        assert_eq!(snapshot.load().unwrap().last_ids.user, 7);
    }

    #[test]
    fn test_lock_file_sits_next_to_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = JsonSnapshot::new(dir.path().join("poker").join("state.json"));
        let mut lock = snapshot.lock().unwrap();
        drop(lock.write().unwrap());

        assert!(dir.path().join("poker").join("state.json.lock").exists());
        assert!(!snapshot.path().exists());
    }

    #[test]
    fn test_write_lock_excludes_other_handles() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = JsonSnapshot::new(dir.path().join("state.json"));
        let mut held = snapshot.lock().unwrap();
        let guard = held.write().unwrap();

        let mut other = snapshot.lock().unwrap();
        assert!(other.lock.try_write().is_err());
        assert!(other.lock.try_read().is_err());

        drop(guard);
        assert!(other.lock.try_write().is_ok());
    }

    /// Seed a three-member task with one story and save it with the first
    /// member's vote already cast. Returns the story and the other members.
    async fn seed_round(snapshot: &JsonSnapshot) -> (StoryId, Vec<UserId>) {
        let store = Arc::new(InMemoryEstimationStore::new());
        let catalog = CatalogUseCase::new(Arc::clone(&store));
        let task = catalog.create_task("Checkout", "").await.unwrap();
        let mut team = Vec::new();
        for name in ["Ann", "Ben", "Cid"] {
            let user = catalog.create_user(name).await.unwrap();
            catalog.add_member(task.id, user.id).await.unwrap();
            team.push(user.id);
        }
        let story = catalog.add_story(task.id, "Cart", "").await.unwrap();
        let card = store.estimates_for_task(task.id).await.unwrap()[3].id;

        SubmitVoteUseCase::new(Arc::clone(&store))
            .execute(SubmitVoteInput::new(story.id, team[0], card))
            .await
            .unwrap();
        snapshot.save(&store.snapshot().await).unwrap();
        (story.id, team[1..].to_vec())
    }

    /// One CLI invocation: lock, load, vote, save.
    fn vote_in_own_process(path: &Path, story: StoryId, user: UserId, start: &Barrier) {
        let snapshot = JsonSnapshot::new(path);
        let mut lock = snapshot.lock().unwrap();
        start.wait();
        let _guard = lock.write().unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let store = Arc::new(InMemoryEstimationStore::from_state(snapshot.load().unwrap()));
            let task = store.story(story).await.unwrap().unwrap().task_id;
            let card = store.estimates_for_task(task).await.unwrap()[4].id;
            SubmitVoteUseCase::new(Arc::clone(&store))
                .execute(SubmitVoteInput::new(story, user, card))
                .await
                .unwrap();
            snapshot.save(&store.snapshot().await).unwrap();
        });
    }

    #[test]
    fn test_concurrent_voters_in_separate_processes_complete_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let snapshot = JsonSnapshot::new(&path);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (story, voters) = runtime.block_on(seed_round(&snapshot));

        let start = Barrier::new(voters.len());
        std::thread::scope(|scope| {
            for &user in &voters {
                let (path, start) = (&path, &start);
                scope.spawn(move || vote_in_own_process(path, story, user, start));
            }
        });

        let store = InMemoryEstimationStore::from_state(snapshot.load().unwrap());
        runtime.block_on(async {
            let story = store.story(story).await.unwrap().unwrap();
            assert_eq!(story.iteration, Iteration::new(1), "all three members voted");
            let first_round = store
                .votes_for_story(story.id, Iteration::FIRST)
                .await
                .unwrap();
            assert_eq!(first_round.len(), 3);
        });
    }
}
