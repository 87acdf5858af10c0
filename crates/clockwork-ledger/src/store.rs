//! JSON file persistence for [`LedgerState`].
//!
//! Writes go to a sibling temporary file that is renamed over the target, so
//! a crash mid-write leaves the previous state intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clockwork_core::traits::Clock;
use thiserror::Error;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::ledger::{Ledger, LedgerState};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state file I/O at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed state file {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("cannot build genesis state: {0}")]
    Genesis(#[from] clockwork_core::error::ClockworkError),
}

/// A state file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<LedgerState, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| self.io(source))?;
        let state = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        debug!(path = %self.path.display(), "loaded ledger state");
        Ok(state)
    }

    /// Load the ledger, or start from genesis when no file exists yet.
    pub fn load_or_genesis(&self, config: &LedgerConfig) -> Result<Ledger, StoreError> {
        if self.exists() {
            Ok(Ledger::from_state(self.load()?))
        } else {
            Ok(Ledger::new(config)?)
        }
    }

    pub fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| self.io(source))?;
        }
        let json = serde_json::to_vec_pretty(state)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| self.io(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io(source))?;
        debug!(path = %self.path.display(), height = state.clock.now(), "saved ledger state");
        Ok(())
    }

    fn io(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}
