// src/packages/mod.rs

//! Installed-package facts for pcurate
//!
//! The engine only ever reads from a [`PackageSource`]. `PacmanSource` asks
//! the system's pacman; `MemorySource` serves a fixed set of packages.

pub mod memory;
pub mod pacman;
pub mod traits;

pub use memory::MemorySource;
pub use pacman::PacmanSource;
pub use traits::{InstalledPackage, Origin, PackageSource, Snapshot};
