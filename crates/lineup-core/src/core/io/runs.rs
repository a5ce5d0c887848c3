//! Persistence of generated runs for later re-export.

use crate::core::models::lineup::Lineup;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RunStoreError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed run record '{path}': {source}")]
    Serde {
        path: String,
        source: serde_json::Error,
    },
    #[error("No stored run with id {0}")]
    NotFound(Uuid),
}

/// Everything needed to re-export a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub seed: u64,
    pub requested: usize,
    pub lineups: Vec<Lineup>,
    /// Why generation stopped before `requested` lineups, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halted: Option<String>,
}

pub trait RunStore {
    fn save(&self, record: &RunRecord) -> Result<(), RunStoreError>;
    fn load(&self, run_id: Uuid) -> Result<RunRecord, RunStoreError>;
    /// Stored run ids, in no particular order.
    fn list(&self) -> Result<Vec<Uuid>, RunStoreError>;
}

/// One pretty-printed JSON file per run, named `<run_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonRunStore {
    dir: PathBuf,
}

impl JsonRunStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RunStoreError + '_ {
    move |source| RunStoreError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

impl RunStore for JsonRunStore {
    fn save(&self, record: &RunRecord) -> Result<(), RunStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.path_for(record.run_id);
        let json = serde_json::to_string_pretty(record).map_err(|source| RunStoreError::Serde {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        std::fs::write(&path, json).map_err(io_error(&path))?;
        debug!(path = %path.display(), "Stored run record.");
        Ok(())
    }

    fn load(&self, run_id: Uuid) -> Result<RunRecord, RunStoreError> {
        let path = self.path_for(run_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RunStoreError::NotFound(run_id));
            }
            Err(e) => return Err(io_error(&path)(e)),
        };
        serde_json::from_str(&content).map_err(|source| RunStoreError::Serde {
            path: path.to_string_lossy().to_string(),
            source,
        })
    }

    fn list(&self) -> Result<Vec<Uuid>, RunStoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir).map_err(io_error(&self.dir))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_error(&self.dir))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
