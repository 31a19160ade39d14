// src/request.rs

//! Requests and their execution
//!
//! The command line is turned into exactly one [`Request`] up front. The
//! [`Curator`] then runs it against the configured store, filter file and
//! package source and returns the text to print.

use crate::config::Config;
use crate::engine::{self, ClassifyOptions, State};
use crate::error::{Error, Result};
use crate::filter::FilterRules;
use crate::format;
use crate::packages::{Origin, PackageSource, Snapshot};
use crate::store::CuratedStore;
use tracing::{debug, info};

/// A single user request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Show the state of one package
    Lookup { name: String },
    /// Mark a package as curated, replacing any tag and description
    SetCurated {
        name: String,
        tag: Option<String>,
        description: Option<String>,
    },
    /// Remove a package's curated status
    UnsetCurated { name: String },
    /// List every package in one state
    Display {
        state: State,
        scope: Option<Origin>,
        verbose: bool,
    },
}

/// Executes requests against the configured store and package source
pub struct Curator<'a> {
    config: &'a Config,
    source: &'a dyn PackageSource,
}

impl<'a> Curator<'a> {
    pub fn new(config: &'a Config, source: &'a dyn PackageSource) -> Self {
        Self { config, source }
    }

    /// Run `request` and return its output
    pub fn execute(&self, request: &Request) -> Result<String> {
        debug!("Executing {:?}", request);

        match request {
            Request::Lookup { name } => {
                let store = self.load_store()?;
                let snapshot = Snapshot::capture(self.source)?;
                let entry = engine::lookup(&snapshot, store.records(), name)?;
                format::format_status(&entry)
            }
            Request::SetCurated {
                name,
                tag,
                description,
            } => {
                let mut store = self.load_store()?;
                let snapshot = Snapshot::capture(self.source)?;
                engine::set_curated(&mut store, &snapshot, name, tag.clone(), description.clone())?;
                store.save()?;
                info!("Curated '{}'", name);

                let entry = engine::lookup(&snapshot, store.records(), name)?;
                format::format_status(&entry)
            }
            Request::UnsetCurated { name } => {
                let mut store = self.load_store()?;
                let snapshot = Snapshot::capture(self.source)?;
                if engine::unset_curated(&mut store, name) {
                    store.save()?;
                    info!("Uncurated '{}'", name);
                } else {
                    debug!("'{}' was not curated", name);
                }

                match engine::lookup(&snapshot, store.records(), name) {
                    Ok(entry) => format::format_status(&entry),
                    Err(Error::PackageNotFound(_)) => Ok(String::new()),
                    Err(e) => Err(e),
                }
            }
            Request::Display {
                state,
                scope,
                verbose,
            } => {
                let mut store = self.load_store()?;
                let rules = FilterRules::load(Some(&self.config.filter_path))?;
                let snapshot = Snapshot::capture(self.source)?;

                let options = ClassifyOptions {
                    scope: *scope,
                    filtered_curated: self.config.filtered_curated,
                };
                let result =
                    engine::classify(&snapshot, store.records(), &rules, self.source, options)?;

                if !result.prune.is_empty() {
                    let removed = store.prune(&result.prune);
                    if removed > 0 {
                        store.save()?;
                    }
                }

                format::format(result.in_state(*state), *verbose)
            }
        }
    }

    fn load_store(&self) -> Result<CuratedStore> {
        CuratedStore::load(&self.config.store_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::{InstalledPackage, MemorySource};
    use tempfile::tempdir;

    fn source() -> MemorySource {
        MemorySource::new([
            InstalledPackage::new("firefox", Origin::Native).with_description("Web browser"),
            InstalledPackage::new("vim", Origin::Native),
            InstalledPackage::new("steam", Origin::Foreign),
        ])
    }

    /// A source whose package manager cannot be reached
    struct UnavailableSource;

    impl PackageSource for UnavailableSource {
        fn list_explicitly_installed(&self) -> Result<Vec<InstalledPackage>> {
            Err(Error::FactSourceUnavailable("pacman not found".to_string()))
        }

        fn is_member_of_group(&self, _group: &str, _package: &str) -> Result<bool> {
            Err(Error::FactSourceUnavailable("pacman not found".to_string()))
        }
    }

    /// Curate vim with a working source so the store file exists
    fn seeded_config(dir: &std::path::Path) -> Config {
        let config = Config::in_dir(dir);
        let source = source();
        Curator::new(&config, &source)
            .execute(&Request::SetCurated {
                name: "vim".to_string(),
                tag: Some("editors".to_string()),
                description: None,
            })
            .unwrap();
        config
    }

    fn display(state: State) -> Request {
        Request::Display {
            state,
            scope: None,
            verbose: false,
        }
    }

    #[test]
    fn test_set_then_display() {
        let dir = tempdir().unwrap();
        let config = Config::in_dir(dir.path());
        let source = source();
        let curator = Curator::new(&config, &source);

        let output = curator
            .execute(&Request::SetCurated {
                name: "vim".to_string(),
                tag: Some("editors".to_string()),
                description: None,
            })
            .unwrap();
        assert_eq!(output, "vim,curated,native,editors,\n");

        assert_eq!(curator.execute(&display(State::Curated)).unwrap(), "vim\n");
        assert_eq!(curator.execute(&display(State::Regular)).unwrap(), "firefox\nsteam\n");
        assert_eq!(curator.execute(&display(State::Missing)).unwrap(), "");
    }

    #[test]
    fn test_set_unknown_package_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let config = Config::in_dir(dir.path());
        let source = source();
        let curator = Curator::new(&config, &source);

        let result = curator.execute(&Request::SetCurated {
            name: "nonexistent-pkg".to_string(),
            tag: None,
            description: None,
        });

        assert!(matches!(result, Err(Error::PackageNotFound(_))));
        assert!(!config.store_path.exists());
    }

    #[test]
    fn test_unset_not_curated_is_noop() {
        let dir = tempdir().unwrap();
        let config = Config::in_dir(dir.path());
        let source = source();
        let curator = Curator::new(&config, &source);

        let output = curator
            .execute(&Request::UnsetCurated { name: "firefox".to_string() })
            .unwrap();
        assert_eq!(output, "firefox,regular,native,,Web browser\n");

        let output = curator
            .execute(&Request::UnsetCurated { name: "not-installed".to_string() })
            .unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_lookup_unknown_package() {
        let dir = tempdir().unwrap();
        let config = Config::in_dir(dir.path());
        let source = source();
        let curator = Curator::new(&config, &source);

        let result = curator.execute(&Request::Lookup { name: "emacs".to_string() });
        assert!(matches!(result, Err(Error::PackageNotFound(_))));
    }

    #[test]
    fn test_corrupt_store_is_fatal() {
        let dir = tempdir().unwrap();
        let config = Config::in_dir(dir.path());
        std::fs::write(&config.store_path, "garbage that is not a database at all, truly").unwrap();
        let source = source();
        let curator = Curator::new(&config, &source);

        let result = curator.execute(&display(State::Curated));
        assert!(matches!(result, Err(Error::StoreCorrupt { .. })));
    }

    #[test]
    fn test_unavailable_source_is_fatal_and_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let config = seeded_config(dir.path());
        let before = std::fs::read(&config.store_path).unwrap();
        let curator = Curator::new(&config, &UnavailableSource);

        let requests = [
            display(State::Curated),
            display(State::Regular),
            display(State::Missing),
            Request::Lookup { name: "vim".to_string() },
            Request::SetCurated {
                name: "firefox".to_string(),
                tag: None,
                description: None,
            },
            Request::UnsetCurated { name: "vim".to_string() },
        ];
        for request in &requests {
            let result = curator.execute(request);
            assert!(
                matches!(result, Err(Error::FactSourceUnavailable(_))),
                "{:?} should fail, got {:?}",
                request,
                result
            );
        }

        assert_eq!(std::fs::read(&config.store_path).unwrap(), before);
    }

    #[test]
    fn test_unset_with_unavailable_source_keeps_record() {
        let dir = tempdir().unwrap();
        let config = seeded_config(dir.path());

        let result = Curator::new(&config, &UnavailableSource)
            .execute(&Request::UnsetCurated { name: "vim".to_string() });
        assert!(matches!(result, Err(Error::FactSourceUnavailable(_))));

        let store = CuratedStore::load(&config.store_path).unwrap();
        assert!(store.contains("vim"));
    }
}
