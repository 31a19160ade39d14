// src/packages/traits.rs

//! Common types and the interface every package fact source implements

use crate::error::Result;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

/// Where an installed package came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Installed from a configured sync repository
    Native,
    /// Built locally or installed from elsewhere (AUR, local files)
    Foreign,
}

impl Origin {
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Native => "native",
            Origin::Foreign => "foreign",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicitly installed package as reported by the package manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub origin: Origin,
    /// The package manager's own description
    pub description: Option<String>,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            origin,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Read-only access to the machine's installed-package facts
pub trait PackageSource {
    /// Every explicitly installed package
    fn list_explicitly_installed(&self) -> Result<Vec<InstalledPackage>>;

    /// Names of packages installed only as dependencies
    ///
    /// Used to explain why a curated package went missing. Sources that
    /// cannot tell return an empty list.
    fn list_dependencies(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Whether `package` belongs to the package group `group`
    ///
    /// A name that is not a known group has no members.
    fn is_member_of_group(&self, group: &str, package: &str) -> Result<bool>;
}

/// Point-in-time view of installed packages, taken once per invocation
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    explicit: BTreeMap<String, InstalledPackage>,
    dependencies: HashSet<String>,
}

impl Snapshot {
    /// Query `source` once for everything classification needs
    pub fn capture(source: &dyn PackageSource) -> Result<Self> {
        let packages = source.list_explicitly_installed()?;
        let dependencies = source.list_dependencies()?;
        debug!(
            "Captured {} explicit and {} dependency packages",
            packages.len(),
            dependencies.len()
        );
        Ok(Self::from_packages(packages).with_dependencies(dependencies))
    }

    pub fn from_packages(packages: impl IntoIterator<Item = InstalledPackage>) -> Self {
        Self {
            explicit: packages.into_iter().map(|p| (p.name.clone(), p)).collect(),
            dependencies: HashSet::new(),
        }
    }

    pub fn with_dependencies(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.dependencies.extend(names);
        self
    }

    /// The explicitly installed package called `name`
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.explicit.get(name)
    }

    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains_key(name)
    }

    pub fn is_dependency(&self, name: &str) -> bool {
        self.dependencies.contains(name)
    }

    /// Explicitly installed packages ordered by name
    pub fn packages(&self) -> impl Iterator<Item = &InstalledPackage> {
        self.explicit.values()
    }

    pub fn len(&self) -> usize {
        self.explicit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty()
    }
}
