// src/db/mod.rs

//! Database layer for pcurate
//!
//! This module handles all SQLite operations including:
//! - Read-only access to an existing store
//! - Atomic replacement of the store file
//! - Schema creation and the curated record table

pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, OpenFlags, Transaction};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

const TEMP_PREFIX: &str = ".pcurate-";
const TEMP_SUFFIX: &str = ".db.tmp";

/// Temp files younger than this may belong to a save still in progress
const STALE_TEMP_AGE: Duration = Duration::from_secs(60);

/// Open an existing database read-only
///
/// Returns `Ok(None)` when there is no file at `db_path`. The file is never
/// created or modified by this call.
pub fn open_existing(db_path: &Path) -> Result<Option<Connection>> {
    if !db_path.exists() {
        return Ok(None);
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    Ok(Some(conn))
}

/// Names of all user tables in the database
pub fn table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Execute a function within a transaction, committing on success
pub fn transaction<F, T>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Build a fresh database next to `db_path` and rename it over `db_path`
///
/// The new file starts with the current schema; `fill` populates it inside a
/// single transaction. Until the final rename the existing file is untouched,
/// and the temporary file is deleted if anything fails along the way.
pub fn replace_atomically<F>(db_path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&Transaction) -> Result<()>,
{
    let parent = match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    sweep_stale_temp_files(parent);

    let temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(parent)?;
    debug!("Writing store to temporary file {}", temp.path().display());

    let mut conn = Connection::open(temp.path())?;
    schema::migrate(&conn)?;
    transaction(&mut conn, fill)?;
    conn.close().map_err(|(_, e)| Error::Database(e))?;

    temp.persist(db_path).map_err(|e| Error::Io(e.error))?;
    debug!("Replaced store at {}", db_path.display());

    Ok(())
}

/// Remove temp files left in `dir` by a save that was killed before it could
/// clean up after itself
///
/// Best effort: anything that cannot be inspected or removed is skipped.
fn sweep_stale_temp_files(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let now = SystemTime::now();

    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(TEMP_PREFIX) || !name.ends_with(TEMP_SUFFIX) {
            continue;
        }

        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age >= STALE_TEMP_AGE);
        if !stale {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => debug!("Removed stale temporary file {}", entry.path().display()),
            Err(e) => warn!("Could not remove {}: {}", entry.path().display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_existing_missing_file() {
        let dir = tempdir().unwrap();
        let result = open_existing(&dir.path().join("absent.db")).unwrap();
        assert!(result.is_none());
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_replace_atomically_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/path/pcurate.db");

        replace_atomically(&db_path, |_| Ok(())).unwrap();

        assert!(db_path.exists());
        let conn = open_existing(&db_path).unwrap().unwrap();
        let tables = table_names(&conn).unwrap();
        assert!(tables.contains(&"curated_packages".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_failed_fill_leaves_existing_file_untouched() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("pcurate.db");
        std::fs::write(&db_path, b"previous contents").unwrap();

        let result = replace_atomically(&db_path, |_| {
            Err(Error::Config("simulated failure".to_string()))
        });
        assert!(result.is_err());

        assert_eq!(std::fs::read(&db_path).unwrap(), b"previous contents");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temporary file should be cleaned up");
    }

    #[test]
    fn test_replace_atomically_sweeps_stale_temp_files() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("pcurate.db");

        let stale = dir.path().join(".pcurate-killed.db.tmp");
        let file = std::fs::File::create(&stale).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
        drop(file);
        let recent = dir.path().join(".pcurate-running.db.tmp");
        std::fs::write(&recent, b"").unwrap();
        let unrelated = dir.path().join("notes.db.tmp");
        std::fs::write(&unrelated, b"").unwrap();

        replace_atomically(&db_path, |_| Ok(())).unwrap();

        assert!(db_path.exists());
        assert!(!stale.exists(), "stale temp file should be swept");
        assert!(recent.exists(), "a recent temp file may still be in use");
        assert!(unrelated.exists());
    }
}
