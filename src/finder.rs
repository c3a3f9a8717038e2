//! Answers module-loader questions from a bundled store.
//!
//! A [`Finder`] is created once per store by the host integration layer,
//! which decides when to install it in its resolution chain. It never
//! writes to the store.

use std::path::Path;

use crate::error::Result;
use crate::platform::Platform;
use crate::store::SqliteStore;
use crate::types::StoredContent;

/// Module content as a loader receives it.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleContent<C> {
    /// Source text; the caller compiles it before execution.
    Source(Vec<u8>),
    /// Ready to execute.
    Compiled(C),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSpec<C> {
    pub name: String,
    /// File name of the store the module came from.
    pub origin: String,
    /// Path of the unit inside the bundled tree.
    pub path: String,
    /// Packages get a submodule search location.
    pub is_package: bool,
    pub content: ModuleContent<C>,
}

/// The lookup surface a host module system consumes.
pub trait ModuleSource {
    type Code;

    fn find_module(&self, fullname: &str) -> Result<Option<ModuleSpec<Self::Code>>>;

    fn list_directory(&self, path: &str) -> Result<Vec<String>>;

    fn find_distributions(&self, name: Option<&str>) -> Result<Vec<String>>;
}

pub struct Finder<P: Platform> {
    store: SqliteStore,
    platform: P,
    origin: String,
}

impl<P: Platform> Finder<P> {
    /// Opens the store at `db_path` and selects the table matching
    /// `platform`.
    pub fn load<T: AsRef<Path>>(db_path: T, platform: P) -> Result<Self> {
        Self::new(SqliteStore::open(db_path)?, platform)
    }

    pub fn new(store: SqliteStore, platform: P) -> Result<Self> {
        let store = store.with_platform(platform.magic_number())?;
        let location = store.location()?;
        let origin = match Path::new(&location).file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => location.clone(),
        };
        Ok(Self {
            store,
            platform,
            origin,
        })
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Reads a file from a bundled distribution's metadata directory, e.g.
    /// its `METADATA`.
    pub fn read_distribution_file(&self, name: &str, filename: &str) -> Result<Vec<u8>> {
        self.store.read_distribution_file(name, filename)
    }
}

impl<P: Platform> ModuleSource for Finder<P> {
    type Code = P::Code;

    fn find_module(&self, fullname: &str) -> Result<Option<ModuleSpec<P::Code>>> {
        let Some(module) = self.store.resolve(fullname)? else {
            return Ok(None);
        };
        let content = match module.content {
            StoredContent::Source(source) => ModuleContent::Source(source),
            StoredContent::Compiled(bytes) => {
                ModuleContent::Compiled(self.platform.deserialize(&bytes)?)
            }
        };
        Ok(Some(ModuleSpec {
            name: fullname.to_string(),
            origin: self.origin.clone(),
            path: module.path,
            is_package: module.is_package,
            content,
        }))
    }

    fn list_directory(&self, path: &str) -> Result<Vec<String>> {
        self.store.list_directory(path)
    }

    fn find_distributions(&self, name: Option<&str>) -> Result<Vec<String>> {
        self.store.find_distributions(name)
    }
}
