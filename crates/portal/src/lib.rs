//! Portal - core of the portal command-line client
//!
//! The `portal` library holds everything a command does before and around its real work:
//! finding and loading the local credentials file, validating it, picking the active portal,
//! emitting usage telemetry and bootstrapping credentials through `init`. Network access,
//! interactive prompts and the telemetry transport sit behind ports so the CLI (or a test)
//! can supply its own adapters.
//!
//! # Main Components
//!
//! - [`config`] - The config document and the [`config::store::ConfigStore`] that owns it
//! - [`resolver`] - Active portal selection
//! - [`pipeline`] - The pre-flight sequence shared by every portal command
//! - [`init`] - The credential bootstrap flow (`init`)
//! - [`usage`] - Fire-and-forget usage tracking
//! - [`api`] - Remote platform port and its HTTP adapter
//! - [`fs`] - File system abstractions
//! - [`vcs`] - Version control inspection
//! - [`validation`] - Validation types and utilities
//!
//! # Examples
//!
//! ```no_run
//! use portal::config::{ConfigSearch, store::ConfigStore};
//! use portal::fs::real::RealFileSystem;
//!
//! let store = ConfigStore::new(RealFileSystem, ConfigSearch::discover(&RealFileSystem, None));
//! if let Some(path) = store.locate() {
//!     println!("Using {}", path.display());
//! }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod fs;
pub mod init;
pub mod pipeline;
pub mod prompt;
pub mod resolver;
pub mod usage;
pub mod validation;
pub mod vcs;
