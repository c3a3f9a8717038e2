use std::io;
use std::path::{Component, Path};

use crate::config::Layout;
use crate::error::{Error, Result};

/// Converts a path relative to the bundle root into the `/`-separated form
/// stored in the `path` column.
pub fn posix_path(relative: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| non_utf8(relative))?;
                segments.push(segment);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path is not relative to the bundle root: {}", relative.display()),
                )));
            }
        }
    }
    Ok(segments.join("/"))
}

fn non_utf8(path: &Path) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("path is not valid UTF-8: {}", path.display()),
    ))
}

/// Logical name and package flag for a stored path.
///
/// Package-init files name their parent directory, source files name
/// themselves without the suffix, and everything else gets an empty name.
pub fn module_name(path: &str, layout: &Layout) -> (String, bool) {
    let path = path.replace('\\', "/");
    let (parent, file_name) = match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", path.as_str()),
    };

    if file_name == layout.init_file {
        (dotted(parent), true)
    } else if layout.is_source_file(file_name) {
        let stem = &path[..path.len() - layout.source_suffix.len()];
        (dotted(stem), false)
    } else {
        (String::new(), false)
    }
}

pub fn dotted(path: &str) -> String {
    path.replace(['/', '\\'], ".")
}

/// Unicode-aware identifier check: a letter or underscore followed by
/// letters, digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
