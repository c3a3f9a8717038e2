//! Walks a directory tree and loads it into the `code` table.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::store::SqliteStore;
use crate::store::naming::{self, is_identifier};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BundleSummary {
    pub files: usize,
    pub namespaces: usize,
    pub skipped: usize,
}

struct Discovered {
    relative: PathBuf,
    posix: String,
    is_dir: bool,
}

/// Bundles everything under `root` into `store`.
///
/// Entries are inserted in lexical order of their relative path so two runs
/// over the same tree produce the same rows.
pub fn bundle(root: &Path, store: &SqliteStore) -> Result<BundleSummary> {
    let layout = store.layout();
    let mut summary = BundleSummary::default();

    let mut discovered = Vec::new();
    let mut pending: Vec<PathBuf> = vec![PathBuf::new()];
    while let Some(dir) = pending.pop() {
        // Links are not followed into directories, so cycles cannot occur.
        let mut children = Vec::new();
        for entry in std::fs::read_dir(root.join(&dir))? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let linked_dir = file_type.is_symlink() && entry.path().is_dir();
            children.push((dir.join(entry.file_name()), file_type.is_dir(), linked_dir));
        }
        children.sort();

        for (relative, is_dir, linked_dir) in children {
            let name = relative
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if linked_dir
                || (!is_dir && layout.is_skipped_suffix(&name))
                || (is_dir && name == layout.cache_dir)
                || (dir.as_os_str().is_empty() && layout.skipped_root_entries.contains(&name))
            {
                debug!(path = %relative.display(), "skipping");
                summary.skipped += 1;
                continue;
            }

            if is_dir {
                pending.push(relative.clone());
            }
            let posix = naming::posix_path(&relative)?;
            discovered.push(Discovered {
                relative,
                posix,
                is_dir,
            });
        }
    }

    discovered.sort_by(|a, b| a.posix.cmp(&b.posix));
    let source_dirs = dirs_with_source(&discovered, store);

    for entry in &discovered {
        if !entry.is_dir {
            let is_package = entry.posix.rsplit('/').next() == Some(layout.init_file.as_str());
            info!("{} {}", if is_package { "*" } else { " " }, entry.posix);
            store.add_file(root, &entry.relative)?;
            summary.files += 1;
            continue;
        }

        if root.join(&entry.relative).join(&layout.init_file).is_file() {
            continue;
        }

        if entry.posix.split('/').all(is_identifier)
            && source_dirs.contains(entry.posix.as_str())
        {
            info!("* {}", entry.posix);
            store.add_directory(&entry.relative)?;
            summary.namespaces += 1;
        } else {
            debug!(path = %entry.posix, "not a namespace package");
            summary.skipped += 1;
        }
    }

    info!(
        files = summary.files,
        namespaces = summary.namespaces,
        skipped = summary.skipped,
        "bundle complete"
    );
    Ok(summary)
}

/// Every directory with at least one source file somewhere beneath it.
fn dirs_with_source<'a>(discovered: &'a [Discovered], store: &SqliteStore) -> HashSet<&'a str> {
    let mut dirs = HashSet::new();
    for entry in discovered {
        if entry.is_dir || !store.layout().is_source_file(&entry.posix) {
            continue;
        }
        let mut path = entry.posix.as_str();
        while let Some((parent, _)) = path.rsplit_once('/') {
            if !dirs.insert(parent) {
                break;
            }
            path = parent;
        }
    }
    dirs
}
