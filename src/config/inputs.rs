//! Input files: the venue allow-list and the candidate list.

use std::path::Path;

use super::ConfigError;
use crate::models::Candidate;

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read canonical venue names, one per line, keeping file order.
///
/// Blank lines are ignored and surrounding whitespace is trimmed.
pub fn load_venue_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = read(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Read candidates from a JSON array of `{ "id", "name", "profile_url" }`
pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>, ConfigError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
