//! Resume point persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("IO error for checkpoint {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid checkpoint {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize checkpoint: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where the next run should pick up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// 1-based number of the first candidate not yet fully processed
    pub next_candidate: usize,

    /// Id of the last fully processed candidate
    #[serde(default)]
    pub last_completed_id: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(next_candidate: usize, last_completed_id: Option<String>) -> Self {
        Self {
            next_candidate,
            last_completed_id,
            updated_at: Utc::now(),
        }
    }

    /// Read a checkpoint; `None` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, CheckpointError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| CheckpointError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Overwrite the checkpoint file
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            "Checkpoint saved: next candidate {} ({})",
            self.next_candidate,
            path.display()
        );
        Ok(())
    }
}
