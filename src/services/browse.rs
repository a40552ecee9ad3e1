//! Validation for a manually browsed game executable.
//!
//! The file picker itself belongs to the embedding UI; this module only
//! decides whether the picked file is acceptable. Both failure cases are
//! correctable input errors, not session-ending ones.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Executable stems accepted from a manual browse.
const GAME_EXECUTABLE_STEMS: [&str; 2] = ["GenshinImpact", "YuanShen"];

/// Why a browsed file was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{0} is not the game executable (expected GenshinImpact.exe or YuanShen.exe)")]
    NotGameExecutable(String),

    #[error("companion data directory {0} does not exist")]
    MissingDataDirectory(Utf8PathBuf),
}

/// Check a browsed path: the file stem must be one of the known game
/// executables, and its `<stem>_Data` sibling directory must exist.
pub fn validate_manual_selection(path: &Utf8Path) -> Result<Utf8PathBuf, SelectionError> {
    let stem = path.file_stem().unwrap_or("");
    if !GAME_EXECUTABLE_STEMS.contains(&stem) {
        return Err(SelectionError::NotGameExecutable(
            path.file_name().unwrap_or("").to_string(),
        ));
    }

    let directory = path.parent().unwrap_or(Utf8Path::new(""));
    let data_dir = directory.join(format!("{stem}_Data"));
    if !data_dir.is_dir() {
        return Err(SelectionError::MissingDataDirectory(data_dir));
    }

    Ok(path.to_path_buf())
}
