mod bundle;
mod compile;
mod describe;
mod inspect;

pub use bundle::run_bundle;
pub use compile::run_compile;
pub use describe::run_describe;
pub use inspect::{run_list, run_resolve};

use std::path::Path;

use crate::store::SqliteStore;

/// Open an existing store, checking it exists
pub fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    if !database.is_file() {
        anyhow::bail!(
            "Database not found at {}. Run 'sqlbundle bundle' first.",
            database.display()
        );
    }

    SqliteStore::open(database).map_err(Into::into)
}
