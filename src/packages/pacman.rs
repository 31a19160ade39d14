// src/packages/pacman.rs

//! Query installed packages from the local pacman database
//!
//! This module implements [`PackageSource`] by running the `pacman`
//! command-line tool. Only query operations are used; nothing here changes
//! the system's package state.

use super::traits::{InstalledPackage, Origin, PackageSource};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::process::Command;
use tracing::{debug, warn};

/// Package source backed by the `pacman` binary
#[derive(Debug, Default)]
pub struct PacmanSource {
    /// Group name -> member names, filled on first lookup of each group
    groups: RefCell<HashMap<String, HashSet<String>>>,
}

impl PacmanSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of `group` from both the sync and local databases
    fn query_group(&self, group: &str) -> Result<HashSet<String>> {
        let mut members = HashSet::new();

        for flag in ["-Sgq", "-Qgq"] {
            let output = pacman_command()
                .args([flag, group])
                .output()
                .map_err(spawn_error)?;

            // A name that is not a group makes pacman exit non-zero
            if output.status.success() {
                members.extend(parse_name_list(&String::from_utf8_lossy(&output.stdout)));
            }
        }

        debug!("Group '{}' has {} member(s)", group, members.len());
        Ok(members)
    }
}

impl PackageSource for PacmanSource {
    fn list_explicitly_installed(&self) -> Result<Vec<InstalledPackage>> {
        debug!("Querying explicitly installed pacman packages");

        let info = run_pacman(&["-Qei"])?;
        let foreign: HashSet<String> = parse_name_list(&run_pacman(&["-Qqem"])?)
            .into_iter()
            .collect();

        let packages: Vec<InstalledPackage> = parse_package_info(&info)
            .into_iter()
            .map(|(name, description)| {
                let origin = if foreign.contains(&name) {
                    Origin::Foreign
                } else {
                    Origin::Native
                };
                InstalledPackage {
                    name,
                    origin,
                    description,
                }
            })
            .collect();

        debug!("Found {} explicitly installed packages", packages.len());
        Ok(packages)
    }

    fn list_dependencies(&self) -> Result<Vec<String>> {
        Ok(parse_name_list(&run_pacman(&["-Qqd"])?))
    }

    fn is_member_of_group(&self, group: &str, package: &str) -> Result<bool> {
        if let Some(members) = self.groups.borrow().get(group) {
            return Ok(members.contains(package));
        }

        let members = self.query_group(group)?;
        let is_member = members.contains(package);
        self.groups.borrow_mut().insert(group.to_string(), members);
        Ok(is_member)
    }
}

/// pacman with untranslated output so field names can be matched
fn pacman_command() -> Command {
    let mut command = Command::new("pacman");
    command.env("LC_ALL", "C");
    command
}

fn spawn_error(e: std::io::Error) -> Error {
    Error::FactSourceUnavailable(format!("Failed to run pacman: {}. Is pacman installed?", e))
}

/// Run a pacman query and return its stdout
///
/// pacman exits with status 1 and no output when a query matches nothing
/// (e.g. `-Qqem` without foreign packages); that is an empty result.
fn run_pacman(args: &[&str]) -> Result<String> {
    let output = pacman_command().args(args).output().map_err(spawn_error)?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stdout.trim().is_empty() && stderr.trim().is_empty() {
        return Ok(String::new());
    }

    Err(Error::FactSourceUnavailable(format!(
        "pacman {} failed: {}",
        args.join(" "),
        stderr.trim()
    )))
}

/// Parse newline separated package names (`pacman -Qq` style output)
fn parse_name_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `pacman -Qi` output into (name, description) pairs
fn parse_package_info(output: &str) -> Vec<(String, Option<String>)> {
    let mut packages = Vec::new();
    let mut current: Option<(String, Option<String>)> = None;

    for line in output.lines() {
        // Continuation lines of multi-value fields are indented
        if line.starts_with(char::is_whitespace) {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Name" => {
                if let Some(package) = current.take() {
                    packages.push(package);
                }
                current = Some((value.to_string(), None));
            }
            "Description" => match current.as_mut() {
                Some((_, description)) => {
                    if !value.is_empty() && value != "None" {
                        *description = Some(value.to_string());
                    }
                }
                None => warn!("Skipping description without a package name: {}", value),
            },
            _ => {}
        }
    }

    if let Some(package) = current {
        packages.push(package);
    }

    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    const QEI_OUTPUT: &str = "\
Name            : firefox
Version         : 120.0-1
Description     : Fast, Private & Safe Web Browser
Architecture    : x86_64
URL             : https://www.mozilla.org/firefox/
Optional Deps   : networkmanager: Location detection via available WiFi networks
                  libnotify: Notification integration [installed]
Install Reason  : Explicitly installed

Name            : yay
Version         : 12.1.3-1
Description     : Yet another yogurt. Pacman wrapper and AUR helper written in go.
Install Reason  : Explicitly installed

Name            : nodesc
Version         : 1.0-1
Description     : None
";

    #[test]
    fn test_parse_package_info() {
        let packages = parse_package_info(QEI_OUTPUT);
        assert_eq!(
            packages,
            vec![
                (
                    "firefox".to_string(),
                    Some("Fast, Private & Safe Web Browser".to_string())
                ),
                (
                    "yay".to_string(),
                    Some("Yet another yogurt. Pacman wrapper and AUR helper written in go.".to_string())
                ),
                ("nodesc".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_parse_package_info_empty() {
        assert!(parse_package_info("").is_empty());
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(parse_name_list("gcc\n  make \n\nbinutils\n"), vec!["gcc", "make", "binutils"]);
    }
}
