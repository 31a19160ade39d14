// src/filter.rs

//! Filter rule set
//!
//! Parses the optional filter file. Each meaningful line names either a
//! package or a package group; which one is only decided when matching, by
//! asking the package source for group membership. Rules only ever hide
//! regular packages.

use crate::error::{Error, Result};
use crate::packages::PackageSource;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// A filter file line that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWarning {
    /// 1-based line number
    pub line: usize,
    pub content: String,
}

/// Package and group names excluded from the regular listing
#[derive(Debug, Clone, Default)]
pub struct FilterRules {
    entries: Vec<String>,
    literals: HashSet<String>,
    warnings: Vec<RuleWarning>,
}

impl FilterRules {
    /// Load rules from `path`; no path or no file means no rules
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No filter file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::FilterRead {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let rules = Self::parse(&String::from_utf8_lossy(&bytes));
        for warning in &rules.warnings {
            warn!(
                "{}:{}: ignoring invalid filter rule '{}'",
                path.display(),
                warning.line,
                warning.content
            );
        }
        debug!("Loaded {} filter rule(s) from {}", rules.len(), path.display());

        Ok(rules)
    }

    /// Parse filter file content, skipping comments, blanks and invalid lines
    pub fn parse(content: &str) -> Self {
        let mut rules = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if !is_valid_name(line) {
                rules.warnings.push(RuleWarning {
                    line: index + 1,
                    content: line.to_string(),
                });
                continue;
            }

            if rules.literals.insert(line.to_string()) {
                rules.entries.push(line.to_string());
            }
        }

        rules
    }

    /// Rules in file order, without duplicates
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is listed literally or belongs to a listed group
    pub fn matches(&self, name: &str, source: &dyn PackageSource) -> Result<bool> {
        if self.literals.contains(name) {
            return Ok(true);
        }

        for entry in &self.entries {
            if source.is_member_of_group(entry, name)? {
                debug!("'{}' is filtered through group '{}'", name, entry);
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// pacman package and group names: alphanumerics and `@._+-`, not
/// starting with a hyphen or dot
fn is_valid_name(name: &str) -> bool {
    !name.starts_with(['-', '.'])
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '+' | '-'))
}
