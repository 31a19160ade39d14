// src/store.rs

//! Curated record store
//!
//! Holds the user's curated packages in memory as a name-keyed map and owns
//! loading it from and saving it to the SQLite file. Mutations only touch the
//! in-memory map; nothing reaches disk until [`CuratedStore::save`].

use crate::db::{self, models::CuratedRecord};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name-keyed view of the curated records
pub type CuratedMap = BTreeMap<String, CuratedRecord>;

/// The persistent set of curated packages
#[derive(Debug, Clone)]
pub struct CuratedStore {
    path: PathBuf,
    records: CuratedMap,
}

impl CuratedStore {
    /// An empty store that will be saved to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: CuratedMap::new(),
        }
    }

    /// Load the store from `path`
    ///
    /// A missing file yields an empty store. A file that exists but cannot
    /// be read as a store fails with [`Error::StoreCorrupt`] so that the
    /// caller never overwrites it with an empty map.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let Some(conn) = db::open_existing(&path).map_err(|e| corrupt(&path, e))? else {
            debug!("No store at {}, starting empty", path.display());
            return Ok(Self::empty(path));
        };

        let records = read_records(&conn).map_err(|e| corrupt(&path, e))?;
        debug!("Loaded {} curated records from {}", records.len(), path.display());

        Ok(Self {
            path,
            records: records.into_iter().map(|r| (r.name.clone(), r)).collect(),
        })
    }

    /// Atomically replace the persisted store with the current records
    pub fn save(&self) -> Result<()> {
        db::replace_atomically(&self.path, |tx| {
            for record in self.records.values() {
                record.insert(tx)?;
            }
            Ok(())
        })?;
        info!("Saved {} curated records to {}", self.records.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &CuratedMap {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&CuratedRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert or fully replace the record for `name`
    ///
    /// Omitted fields are cleared on an existing record. The original
    /// curation time is kept, so repeating the same call leaves the store
    /// unchanged.
    pub fn set(
        &mut self,
        name: &str,
        tag: Option<String>,
        description: Option<String>,
    ) -> &CuratedRecord {
        let record = match self.records.remove(name) {
            Some(existing) => CuratedRecord {
                name: existing.name,
                tag,
                description,
                curated_at: existing.curated_at,
            },
            None => CuratedRecord::new(name.to_string(), tag, description),
        };

        self.records.entry(name.to_string()).or_insert(record)
    }

    /// Remove the record for `name`; returns whether one existed
    pub fn unset(&mut self, name: &str) -> bool {
        self.records.remove(name).is_some()
    }

    /// Remove every listed name, returning how many records were dropped
    pub fn prune<'a, I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let removed = names
            .into_iter()
            .filter(|name| self.records.remove(name.as_str()).is_some())
            .count();
        if removed > 0 {
            info!("Pruned {} curated record(s)", removed);
        }
        removed
    }
}

fn read_records(conn: &rusqlite::Connection) -> std::result::Result<Vec<CuratedRecord>, String> {
    let tables = db::table_names(conn).map_err(|e| e.to_string())?;

    if tables.iter().any(|t| t == "curated_packages") {
        CuratedRecord::list_all(conn).map_err(|e| e.to_string())
    } else if tables.iter().any(|t| t == "packages") {
        info!("Importing curated packages from a pcurate 0.1 database");
        CuratedRecord::list_legacy(conn).map_err(|e| e.to_string())
    } else if tables.is_empty() {
        Ok(Vec::new())
    } else {
        Err(format!("unrecognized layout (tables: {})", tables.join(", ")))
    }
}

fn corrupt(path: &Path, reason: impl ToString) -> Error {
    Error::StoreCorrupt {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
