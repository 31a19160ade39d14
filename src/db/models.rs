// src/db/models.rs

//! Data models for pcurate database entities
//!
//! This module defines the curated record and the methods that read and
//! write it, including the import path for databases written by pcurate 0.1.

use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};

/// A package the user has deliberately marked as a keeper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedRecord {
    pub name: String,
    pub tag: Option<String>,
    /// Overrides the package manager's description when present
    pub description: Option<String>,
    /// RFC 3339 UTC timestamp of when the package was first curated
    pub curated_at: String,
}

impl CuratedRecord {
    /// Create a new CuratedRecord stamped with the current time
    pub fn new(name: String, tag: Option<String>, description: Option<String>) -> Self {
        Self {
            name,
            tag,
            description,
            curated_at: now_timestamp(),
        }
    }

    /// Insert this record into the database, replacing any row with the same name
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO curated_packages (name, tag, description, curated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![&self.name, &self.tag, &self.description, &self.curated_at],
        )?;
        Ok(())
    }

    /// List all records ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT name, tag, description, curated_at FROM curated_packages ORDER BY name",
        )?;

        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// List curated rows from a pcurate 0.1 `packages` table
    ///
    /// That layout kept every explicitly installed package with a `curated`
    /// flag and stored absent values as empty strings.
    pub fn list_legacy(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT name, tag, description FROM packages WHERE curated = 1 ORDER BY name",
        )?;

        let imported_at = now_timestamp();
        let records = stmt
            .query_map([], |row| {
                Ok(Self {
                    name: row.get(0)?,
                    tag: non_empty(row.get(1)?),
                    description: non_empty(row.get(2)?),
                    curated_at: imported_at.clone(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            tag: row.get(1)?,
            description: row.get(2)?,
            curated_at: row.get(3)?,
        })
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    #[test]
    fn test_insert_and_list() {
        let conn = Connection::open_in_memory().unwrap();
        schema::migrate(&conn).unwrap();

        let vim = CuratedRecord::new("vim".to_string(), Some("editors".to_string()), None);
        let htop = CuratedRecord::new("htop".to_string(), None, Some("top, but nicer".to_string()));
        vim.insert(&conn).unwrap();
        htop.insert(&conn).unwrap();

        let records = CuratedRecord::list_all(&conn).unwrap();
        assert_eq!(records, vec![htop, vim]);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let conn = Connection::open_in_memory().unwrap();
        schema::migrate(&conn).unwrap();

        CuratedRecord::new("vim".to_string(), Some("editors".to_string()), None)
            .insert(&conn)
            .unwrap();
        let replacement = CuratedRecord::new("vim".to_string(), None, Some("vi improved".to_string()));
        replacement.insert(&conn).unwrap();

        assert_eq!(CuratedRecord::list_all(&conn).unwrap(), vec![replacement]);
    }

    #[test]
    fn test_curated_at_is_rfc3339() {
        let record = CuratedRecord::new("vim".to_string(), None, None);
        assert!(chrono::DateTime::parse_from_rfc3339(&record.curated_at).is_ok());
    }

    #[test]
    fn test_list_legacy_imports_only_curated_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE packages (name text PRIMARY KEY, curated integer, tag text, description text);
            INSERT INTO packages VALUES ('vim', 1, 'editors', '');
            INSERT INTO packages VALUES ('firefox', 0, '', 'web browser');
            INSERT INTO packages VALUES ('htop', 1, '', 'process viewer');
            ",
        )
        .unwrap();

        let records = CuratedRecord::list_legacy(&conn).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "htop");
        assert_eq!(records[0].tag, None);
        assert_eq!(records[0].description.as_deref(), Some("process viewer"));
        assert_eq!(records[1].name, "vim");
        assert_eq!(records[1].tag.as_deref(), Some("editors"));
        assert_eq!(records[1].description, None);
    }
}
