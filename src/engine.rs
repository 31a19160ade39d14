// src/engine.rs

//! Classification engine
//!
//! Joins the installed-package snapshot with the curated records and the
//! filter rules. Every relevant package ends up in exactly one state:
//!
//! - Curated: has a record and is still explicitly installed
//! - Regular: explicitly installed, no record, not filtered
//! - Missing: has a record but is no longer explicitly installed
//!
//! Classification never writes. Records it proposes to drop are returned in
//! [`Reconciliation::prune`] for the caller to persist or ignore.

use crate::config::FilteredCuratedPolicy;
use crate::db::models::CuratedRecord;
use crate::error::{Error, Result};
use crate::filter::FilterRules;
use crate::packages::{InstalledPackage, Origin, PackageSource, Snapshot};
use crate::store::{CuratedMap, CuratedStore};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Classification state, ordered the way mixed output is grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    Curated,
    Regular,
    Missing,
}

impl State {
    pub fn as_str(&self) -> &str {
        match self {
            State::Curated => "curated",
            State::Regular => "regular",
            State::Missing => "missing",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a curated package is classified as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// Not installed at all
    NotInstalled,
    /// Still installed, but only as a dependency
    NotExplicit,
}

/// One package's computed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    pub state: State,
    /// Unknown for packages that are not explicitly installed
    pub origin: Option<Origin>,
    pub tag: Option<String>,
    /// Curated description if set, otherwise the package manager's
    pub description: Option<String>,
    pub missing_reason: Option<MissingReason>,
}

impl Classification {
    fn curated(record: &CuratedRecord, package: &InstalledPackage) -> Self {
        Self {
            name: record.name.clone(),
            state: State::Curated,
            origin: Some(package.origin),
            tag: record.tag.clone(),
            description: record
                .description
                .clone()
                .or_else(|| package.description.clone()),
            missing_reason: None,
        }
    }

    fn regular(package: &InstalledPackage) -> Self {
        Self {
            name: package.name.clone(),
            state: State::Regular,
            origin: Some(package.origin),
            tag: None,
            description: package.description.clone(),
            missing_reason: None,
        }
    }

    fn missing(record: &CuratedRecord, reason: MissingReason) -> Self {
        Self {
            name: record.name.clone(),
            state: State::Missing,
            origin: None,
            tag: record.tag.clone(),
            description: record.description.clone(),
            missing_reason: Some(reason),
        }
    }
}

/// Knobs for a classification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Only consider installed packages of this origin
    pub scope: Option<Origin>,
    pub filtered_curated: FilteredCuratedPolicy,
}

/// Result of a classification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Curated, then Regular, then Missing; by name within each state
    pub entries: Vec<Classification>,
    /// Curated records that now match a filter rule
    pub prune: BTreeSet<String>,
}

impl Reconciliation {
    pub fn in_state(&self, state: State) -> impl Iterator<Item = &Classification> {
        self.entries.iter().filter(move |c| c.state == state)
    }

    pub fn names(&self, state: State) -> Vec<&str> {
        self.in_state(state).map(|c| c.name.as_str()).collect()
    }
}

/// Classify every curated record and every explicitly installed package
///
/// With a scope, installed packages of the other origin are left out
/// entirely; missing packages have no known origin and are always kept.
/// Filter rules hide regular packages. Under
/// [`FilteredCuratedPolicy::Prune`] a curated package matching a rule is
/// hidden too and proposed for pruning; under `Keep` it stays curated.
pub fn classify(
    snapshot: &Snapshot,
    records: &CuratedMap,
    rules: &FilterRules,
    source: &dyn PackageSource,
    options: ClassifyOptions,
) -> Result<Reconciliation> {
    let in_scope = |package: &InstalledPackage| options.scope.is_none_or(|s| s == package.origin);

    let mut curated = Vec::new();
    let mut missing = Vec::new();
    let mut prune = BTreeSet::new();

    for (name, record) in records {
        match snapshot.get(name) {
            Some(package) => {
                if !in_scope(package) {
                    continue;
                }
                if options.filtered_curated == FilteredCuratedPolicy::Prune
                    && !rules.is_empty()
                    && rules.matches(name, source)?
                {
                    debug!("Curated package '{}' matches a filter rule", name);
                    prune.insert(name.clone());
                    continue;
                }
                curated.push(Classification::curated(record, package));
            }
            None => {
                let reason = if snapshot.is_dependency(name) {
                    MissingReason::NotExplicit
                } else {
                    MissingReason::NotInstalled
                };
                missing.push(Classification::missing(record, reason));
            }
        }
    }

    let mut regular = Vec::new();
    let mut filtered = 0usize;
    for package in snapshot.packages() {
        if records.contains_key(&package.name) || !in_scope(package) {
            continue;
        }
        if !rules.is_empty() && rules.matches(&package.name, source)? {
            filtered += 1;
            continue;
        }
        regular.push(Classification::regular(package));
    }

    debug!(
        "Classified {} curated, {} regular, {} missing ({} filtered, {} to prune)",
        curated.len(),
        regular.len(),
        missing.len(),
        filtered,
        prune.len()
    );

    let mut entries = curated;
    entries.append(&mut regular);
    entries.append(&mut missing);

    Ok(Reconciliation { entries, prune })
}

/// Current state of a single package
///
/// Fails with [`Error::PackageNotFound`] when the name is neither curated
/// nor explicitly installed.
pub fn lookup(snapshot: &Snapshot, records: &CuratedMap, name: &str) -> Result<Classification> {
    match (records.get(name), snapshot.get(name)) {
        (Some(record), Some(package)) => Ok(Classification::curated(record, package)),
        (Some(record), None) => {
            let reason = if snapshot.is_dependency(name) {
                MissingReason::NotExplicit
            } else {
                MissingReason::NotInstalled
            };
            Ok(Classification::missing(record, reason))
        }
        (None, Some(package)) => Ok(Classification::regular(package)),
        (None, None) => Err(Error::PackageNotFound(name.to_string())),
    }
}

/// Mark an explicitly installed package as curated
///
/// Replaces any existing tag and description. Packages that are not
/// explicitly installed are rejected and the store is left unchanged.
pub fn set_curated(
    store: &mut CuratedStore,
    snapshot: &Snapshot,
    name: &str,
    tag: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if !snapshot.is_explicit(name) {
        return Err(Error::PackageNotFound(name.to_string()));
    }

    store.set(name, tag, description);
    debug!("Set curated status for '{}'", name);
    Ok(())
}

/// Remove a package's curated status; returns whether it was curated
pub fn unset_curated(store: &mut CuratedStore, name: &str) -> bool {
    let removed = store.unset(name);
    if removed {
        debug!("Unset curated status for '{}'", name);
    }
    removed
}
