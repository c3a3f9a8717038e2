use std::path::PathBuf;

use serde::Serialize;

use crate::types::MagicNumberRecord;

use super::open_store;

#[derive(Serialize)]
struct PackageOutput {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct StoreDescription {
    metadata: Vec<(String, String)>,
    magic_numbers: Vec<MagicNumberRecord>,
    packages: Vec<PackageOutput>,
}

/// Reads `Name:` and `Version:` from the header block of a metadata file.
fn parse_package_metadata(raw: &[u8]) -> Option<PackageOutput> {
    let text = String::from_utf8_lossy(raw);
    let mut name = None;
    let mut version = None;
    for line in text.lines().take_while(|line| !line.is_empty()) {
        if let Some(value) = line.strip_prefix("Name: ") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Version: ") {
            version = Some(value.trim().to_string());
        }
    }
    match (name, version) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Some(PackageOutput { name, version })
        }
        _ => None,
    }
}

pub fn run_describe(database: PathBuf, json: bool) -> anyhow::Result<()> {
    let store = open_store(&database)?;

    let metadata = store.get_store_metadata()?;
    let magic_numbers = store.magic_number_records()?;
    let mut packages = Vec::new();
    store.iter_package_metadata(|raw| {
        if let Some(package) = parse_package_metadata(&raw) {
            packages.push(package);
        }
        Ok(())
    })?;

    let description = StoreDescription {
        metadata,
        magic_numbers,
        packages,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!();
    println!("Database info");
    println!("{}", "─".repeat(20));
    for (field, value) in &description.metadata {
        let mut lines = value.lines();
        println!("{:<14}{}", format!("{field}:"), lines.next().unwrap_or_default());
        for line in lines {
            println!("{:<14}{line}", "");
        }
    }
    println!();

    if description.magic_numbers.is_empty() {
        println!("The source code has not been pre-compiled.");
    } else {
        println!("The source code has been pre-compiled for:");
        for record in &description.magic_numbers {
            println!(
                "  {:<8}{}",
                record.magic_number.value(),
                record.platform_identifier
            );
        }
    }
    println!();

    if description.packages.is_empty() {
        println!("No installed packages were found.");
    } else {
        println!("Installed packages:");
        for package in &description.packages {
            println!("  {:<24}{}", package.name, package.version);
        }
    }
    println!();

    Ok(())
}
