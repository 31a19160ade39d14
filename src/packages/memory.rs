// src/packages/memory.rs

//! In-memory package source
//!
//! Holds a fixed set of packages and groups. Used by tests and anywhere the
//! installed state is already known without asking pacman.

use super::traits::{InstalledPackage, PackageSource};
use crate::error::Result;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    packages: Vec<InstalledPackage>,
    dependencies: Vec<String>,
    groups: HashMap<String, HashSet<String>>,
}

impl MemorySource {
    pub fn new(packages: impl IntoIterator<Item = InstalledPackage>) -> Self {
        Self {
            packages: packages.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_dependencies<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_group<S: Into<String>>(
        mut self,
        group: &str,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        self.groups
            .entry(group.to_string())
            .or_default()
            .extend(members.into_iter().map(Into::into));
        self
    }
}

impl PackageSource for MemorySource {
    fn list_explicitly_installed(&self) -> Result<Vec<InstalledPackage>> {
        Ok(self.packages.clone())
    }

    fn list_dependencies(&self) -> Result<Vec<String>> {
        Ok(self.dependencies.clone())
    }

    fn is_member_of_group(&self, group: &str, package: &str) -> Result<bool> {
        Ok(self
            .groups
            .get(group)
            .is_some_and(|members| members.contains(package)))
    }
}
