//! JSON file store for native builds

use std::path::{Path, PathBuf};

use super::{HighScoreRecord, HighScoreStore, StoreError};

/// Best score kept in a small JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<HighScoreRecord>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(HighScoreRecord::from_json(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, record: HighScoreRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Write then rename so a crash never leaves a half-written record
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, record.to_json()?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl HighScoreStore for FileStore {
    fn load_high_score(&self) -> u64 {
        match self.read() {
            Ok(Some(record)) => {
                log::info!("Loaded high score {} from {}", record.best, self.path.display());
                record.best
            }
            Ok(None) => {
                log::info!("No high score at {}, starting fresh", self.path.display());
                0
            }
            Err(e) => {
                log::warn!("Ignoring high score file {}: {}", self.path.display(), e);
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u64) {
        match self.write(HighScoreRecord { best: score }) {
            Ok(()) => log::info!("High score {} saved", score),
            Err(e) => log::warn!("Failed to save high score to {}: {}", self.path.display(), e),
        }
    }
}
