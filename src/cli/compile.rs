use std::path::PathBuf;

use crate::compiler::{self, CompileOutcome};
use crate::platform::{LiteralPlatform, Platform};

use super::open_store;

pub fn run_compile(database: PathBuf) -> anyhow::Result<()> {
    let store = open_store(&database)?;
    let platform = LiteralPlatform::new();

    match store.transaction(|store| compiler::compile_all(store, &platform))? {
        CompileOutcome::AlreadyCompiled { identifier } => {
            println!("The source code in the database has already been compiled");
            println!(
                "for magic number {} ({identifier})",
                platform.magic_number()
            );
        }
        CompileOutcome::Compiled { units } => {
            println!(
                "Compiled {units} units for magic number {} ({})",
                platform.magic_number(),
                platform.identifier()
            );
        }
    }

    Ok(())
}
