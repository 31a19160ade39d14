// src/lib.rs

//! pcurate
//!
//! Keep a curated, annotated subset of the packages explicitly installed on
//! an Arch Linux system and reconcile it against what is actually installed.
//!
//! # Architecture
//!
//! - Packages: read-only facts from pacman, captured once per run
//! - Store: curated records in SQLite, replaced atomically on save
//! - Filter: package and group names hidden from the regular listing
//! - Engine: classifies every package as curated, regular or missing
//! - Format: plain name lists or comma separated records

pub mod config;
pub mod db;
pub mod engine;
mod error;
pub mod filter;
pub mod format;
pub mod packages;
pub mod request;
pub mod store;

pub use error::{Error, Result};
