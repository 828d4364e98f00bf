//! Where the local mirror database lives on disk.

use crate::error::{Result, StoreError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "tagsync";
const DB_FILENAME: &str = "tagsync.sqlite3";

/// `$XDG_DATA_HOME/tagsync`, falling back to `~/.local/share/tagsync`.
pub fn data_dir() -> Result<PathBuf> {
    match env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        Some(base) if base.as_os_str().is_empty() => Err(StoreError::InvalidDataPath(base)),
        Some(base) => Ok(base.join(APP_DIR)),
        None => dirs::home_dir()
            .map(|home| home.join(".local").join("share").join(APP_DIR))
            .ok_or(StoreError::MissingHomeDir),
    }
}

/// An explicit path wins. Its parent is created when missing but an existing
/// directory keeps whatever permissions the user gave it; the default data
/// directory is always kept private.
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    let Some(path) = custom else {
        let dir = data_dir()?;
        fs::create_dir_all(&dir)?;
        make_private(&dir)?;
        return Ok(dir.join(DB_FILENAME));
    };
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidDataPath(path));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)?;
            make_private(parent)?;
        }
        _ => {}
    }
    Ok(path)
}

#[cfg(unix)]
fn make_private(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_private(_dir: &Path) -> Result<()> {
    Ok(())
}
