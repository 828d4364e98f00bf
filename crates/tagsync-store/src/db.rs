//! Connection setup for file-backed and in-memory stores.

use crate::error::{Result, StoreError};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    restrict_permissions(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        return Err(StoreError::Migration(format!(
            "journal mode {mode} instead of wal for {}",
            path.display()
        )));
    }
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

/// In-memory stores keep SQLite's default memory journal.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

/// Deleting a post cascades to its tags and proposals, so enforcement is
/// required rather than best effort.
fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    let enabled: bool = conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
    if !enabled {
        return Err(StoreError::Migration(
            "sqlite build does not enforce foreign keys".to_string(),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if path.exists() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
