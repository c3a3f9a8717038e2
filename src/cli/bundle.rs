use std::path::PathBuf;

use crate::bundler;
use crate::config::Layout;
use crate::store::SqliteStore;

pub fn run_bundle(
    directory: PathBuf,
    database: PathBuf,
    layout: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !directory.is_dir() {
        anyhow::bail!("{} is not a directory", directory.display());
    }
    if database.exists() {
        anyhow::bail!(
            "{} already exists. Bundling only creates new databases.",
            database.display()
        );
    }

    let layout = match layout {
        Some(path) => Layout::from_toml_file(&path)?,
        None => Layout::default(),
    };

    let store = SqliteStore::new(&database)?.with_layout(layout);
    let summary = store.transaction(|store| {
        store.initialize()?;
        bundler::bundle(&directory, store)
    })?;

    println!(
        "Bundled {} files and {} namespace packages into {}",
        summary.files,
        summary.namespaces,
        database.display()
    );

    Ok(())
}
