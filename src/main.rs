// src/main.rs

use anyhow::{Result, anyhow};
use clap::{ArgGroup, CommandFactory, Parser};
use clap_complete::Shell;
use pcurate::config::Config;
use pcurate::engine::State;
use pcurate::packages::{Origin, PacmanSource};
use pcurate::request::{Curator, Request};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "pcurate")]
#[command(author, version, about = "Curate the explicitly installed packages on an Arch Linux system", long_about = None)]
#[command(group(ArgGroup::new("display").args(["curated", "regular", "missing"])))]
struct Cli {
    /// Package to show or modify
    #[arg(
        value_name = "PACKAGE_NAME",
        required_unless_present_any = ["curated", "regular", "missing", "completions"],
        conflicts_with = "display"
    )]
    package: Option<String>,

    /// Set package curated status
    #[arg(short = 's', long, requires = "package", conflicts_with = "unset")]
    set: bool,

    /// Unset package curated status
    #[arg(short = 'u', long, requires = "package")]
    unset: bool,

    /// Set package tag
    #[arg(short = 't', long, value_name = "TAG", requires = "set")]
    tag: Option<String>,

    /// Set package description
    #[arg(short = 'd', long = "desc", value_name = "DESCRIPTION", requires = "set")]
    description: Option<String>,

    /// Display all curated packages
    #[arg(short = 'c', long)]
    curated: bool,

    /// Display packages that are not curated
    #[arg(short = 'n', long, visible_alias = "normal")]
    regular: bool,

    /// Display curated packages that are no longer explicitly installed
    #[arg(short = 'm', long)]
    missing: bool,

    /// Only consider native packages
    #[arg(short = 'N', long, requires = "display", conflicts_with = "foreign")]
    native: bool,

    /// Only consider foreign packages
    #[arg(short = 'F', long, requires = "display")]
    foreign: bool,

    /// Display additional info (comma separated)
    #[arg(short = 'v', long, requires = "display")]
    verbose: bool,

    /// Configuration directory (default: $XDG_CONFIG_HOME/pcurate)
    #[arg(long, env = "PCURATE_CONFIG_DIR", value_name = "PATH")]
    config_dir: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,
}

impl Cli {
    fn request(&self) -> Option<Request> {
        if let Some(name) = &self.package {
            let name = name.clone();
            return Some(if self.set {
                Request::SetCurated {
                    name,
                    tag: self.tag.clone(),
                    description: self.description.clone(),
                }
            } else if self.unset {
                Request::UnsetCurated { name }
            } else {
                Request::Lookup { name }
            });
        }

        let state = if self.curated {
            State::Curated
        } else if self.regular {
            State::Regular
        } else if self.missing {
            State::Missing
        } else {
            return None;
        };

        let scope = if self.native {
            Some(Origin::Native)
        } else if self.foreign {
            Some(Origin::Foreign)
        } else {
            None
        };

        Some(Request::Display {
            state,
            scope,
            verbose: self.verbose,
        })
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "pcurate", &mut io::stdout());
        return Ok(());
    }

    let request = cli
        .request()
        .ok_or_else(|| anyhow!("Nothing to do; see --help"))?;

    let config = Config::resolve(cli.config_dir.clone())?;
    debug!("Using configuration: {:?}", config);

    let source = PacmanSource::new();
    let output = Curator::new(&config, &source).execute(&request)?;

    if let Err(e) = io::stdout().lock().write_all(output.as_bytes())
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        return Err(e.into());
    }

    Ok(())
}
