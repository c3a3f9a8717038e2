//! Fills a per-platform compiled table from the source already in a store.

use tracing::info;

use crate::error::Result;
use crate::platform::Platform;
use crate::store::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Compiled { units: usize },
    /// The platform's magic number was already marked complete; nothing was
    /// written.
    AlreadyCompiled { identifier: String },
}

/// Compiles every source unit in `store` for `platform`.
///
/// The magic number is marked complete only after every unit compiled, so
/// readers never select a partially filled table. Run this inside
/// [`SqliteStore::transaction`] to also discard the partial table on failure.
pub fn compile_all<P: Platform>(store: &SqliteStore, platform: &P) -> Result<CompileOutcome> {
    let magic = platform.magic_number();
    if let Some(identifier) = store.get_magic_numbers()?.remove(&magic) {
        info!(%magic, %identifier, "source already compiled for this magic number");
        return Ok(CompileOutcome::AlreadyCompiled { identifier });
    }

    store.create_compiled_table(magic)?;

    let mut units = 0;
    store.iter_source_entries(|entry| {
        let code = platform.compile(&entry.source, &entry.path)?;
        let compiled = platform.serialize(&code)?;
        store.add_compiled_entry(magic, &entry.fullname, &entry.path, entry.is_package, &compiled)?;
        units += 1;
        Ok(())
    })?;

    // Namespace packages have no source; they compile as empty modules.
    store.iter_namespace_entries(|fullname, path| {
        let code = platform.compile(b"", &path)?;
        let compiled = platform.serialize(&code)?;
        store.add_compiled_entry(magic, &fullname, &path, true, &compiled)?;
        units += 1;
        Ok(())
    })?;

    let identifier = platform.identifier();
    store.mark_platform_complete(magic, &identifier)?;
    info!(%magic, %identifier, units, "compiled source");
    Ok(CompileOutcome::Compiled { units })
}
