//! Runtime-loaded rosters.
//!
//! Lists of active member ids and recent tournament ids are deployment
//! artifacts kept in newline-delimited files and loaded explicitly at
//! startup rather than compiled in.

use std::fs;
use std::path::Path;

use crate::error::{Result, TdError};

/// Load a newline-delimited id list. Blank lines are ignored; any other
/// unparseable line is an error naming the offending line.
pub fn load_id_list(path: &Path) -> Result<Vec<u64>> {
    let content = fs::read_to_string(path)?;
    let mut ids = Vec::new();
    for (line_number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let id = trimmed.parse().map_err(|_| {
            TdError::Parse(format!(
                "{}:{}: invalid id {trimmed:?}",
                path.display(),
                line_number + 1
            ))
        })?;
        ids.push(id);
    }
    Ok(ids)
}
