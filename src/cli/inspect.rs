use std::path::PathBuf;

use crate::finder::{Finder, ModuleContent, ModuleSource};
use crate::platform::LiteralPlatform;

use super::open_store;

pub fn run_list(database: PathBuf, prefix: String) -> anyhow::Result<()> {
    let store = open_store(&database)?;
    for entry in store.list_directory(&prefix)? {
        println!("{entry}");
    }
    Ok(())
}

pub fn run_resolve(database: PathBuf, fullname: String) -> anyhow::Result<()> {
    let finder = Finder::new(open_store(&database)?, LiteralPlatform::new())?;

    let Some(spec) = finder.find_module(&fullname)? else {
        anyhow::bail!("{fullname} not found in {}", database.display());
    };

    let kind = match spec.content {
        ModuleContent::Source(_) => "source",
        ModuleContent::Compiled(_) => "compiled",
    };
    println!("name:       {}", spec.name);
    println!("origin:     {}", spec.origin);
    println!("path:       {}", spec.path);
    println!("package:    {}", spec.is_package);
    println!("content:    {kind}");
    Ok(())
}
