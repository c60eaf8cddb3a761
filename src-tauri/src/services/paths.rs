use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::PetError;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

const DATA_DIR_NAME: &str = "data";
const SETTINGS_FILE_NAME: &str = "settings.json";

fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(|p| p.to_path_buf())
}

/// Resolve the application's data directory.
///
/// Single source of truth: `<exe_dir>/data`. The directory itself is created
/// lazily by the first settings save.
pub(crate) fn data_dir() -> Result<PathBuf, PetError> {
    if let Some(dir) = DATA_DIR.get() {
        return Ok(dir.clone());
    }

    let dir = exe_dir()
        .ok_or_else(|| PetError::internal("Failed to resolve executable directory"))?
        .join(DATA_DIR_NAME);
    let _ = DATA_DIR.set(dir.clone());
    Ok(dir)
}

pub(crate) fn settings_path() -> Result<PathBuf, PetError> {
    Ok(data_dir()?.join(SETTINGS_FILE_NAME))
}

/// Resolve a user-supplied asset path. Relative paths are tried against the
/// working directory first, then next to the executable.
pub(crate) fn resolve_asset(path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() || candidate.exists() {
        return candidate;
    }
    match exe_dir() {
        Some(dir) if dir.join(&candidate).exists() => dir.join(candidate),
        _ => candidate,
    }
}
