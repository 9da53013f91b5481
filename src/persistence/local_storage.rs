//! Browser LocalStorage store

use super::{HighScoreRecord, HighScoreStore, StoreError};

/// Best score kept under a LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

impl LocalStorageStore {
    pub const DEFAULT_KEY: &'static str = "tako_jump_high_score";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("no LocalStorage".to_string()))
    }

    fn read(&self) -> Result<Option<HighScoreRecord>, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(json)) => Ok(Some(HighScoreRecord::from_json(&json)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Unavailable(format!("{e:?}"))),
        }
    }

    fn write(&self, record: HighScoreRecord) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(&self.key, &record.to_json()?)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}

impl HighScoreStore for LocalStorageStore {
    fn load_high_score(&self) -> u64 {
        match self.read() {
            Ok(record) => record.map_or(0, |r| r.best),
            Err(e) => {
                log::warn!("Ignoring stored high score: {}", e);
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u64) {
        match self.write(HighScoreRecord { best: score }) {
            Ok(()) => log::info!("High score {} saved", score),
            Err(e) => log::warn!("Failed to save high score: {}", e),
        }
    }
}
