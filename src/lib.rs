//! # sqlbundle
//!
//! Packs a tree of code modules into one SQLite database and serves them back
//! to a module loader, replacing thousands of small file opens with indexed
//! lookups.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! sqlbundle = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::path::Path;
//! use sqlbundle::bundler::bundle;
//! use sqlbundle::compiler::compile_all;
//! use sqlbundle::finder::{Finder, ModuleSource};
//! use sqlbundle::platform::LiteralPlatform;
//! use sqlbundle::store::SqliteStore;
//!
//! let store = SqliteStore::new("bundle.db").unwrap();
//! store.initialize().unwrap();
//! bundle(Path::new("./site-packages"), &store).unwrap();
//! compile_all(&store, &LiteralPlatform::new()).unwrap();
//!
//! let finder = Finder::new(store, LiteralPlatform::new()).unwrap();
//! let spec = finder.find_module("pkg.mod").unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI module. Disable with `default-features = false`.

pub mod bundler;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod finder;
pub mod platform;
pub mod store;
pub mod types;
