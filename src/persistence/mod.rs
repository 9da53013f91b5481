//! High score persistence
//!
//! The session talks to a [`HighScoreStore`]; the medium is up to the host.
//! Stores never fail loudly: problems are logged and a missing or unreadable
//! record reads as 0.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Errors from a backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored record is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Serialized form of the best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub best: u64,
}

impl HighScoreRecord {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self)?)
    }
}

/// Where the best score lives between sessions
pub trait HighScoreStore {
    fn load_high_score(&self) -> u64;
    fn save_high_score(&mut self, score: u64);
}

/// In-memory store. Clones share the same record, so a test can keep a handle
/// after giving one to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Rc<Cell<u64>>,
    saves: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(best: u64) -> Self {
        let store = Self::default();
        store.best.set(best);
        store
    }

    pub fn high_score(&self) -> u64 {
        self.best.get()
    }

    /// Number of times a score was saved
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> u64 {
        self.best.get()
    }

    fn save_high_score(&mut self, score: u64) {
        self.best.set(score);
        self.saves.set(self.saves.get() + 1);
    }
}
