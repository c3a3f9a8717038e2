pub mod naming;
mod schema;
mod sqlite;

pub use schema::STORE_FORMAT_VERSION;
pub use sqlite::SqliteStore;

/// How [`SqliteStore::get_file`] selects a row of the `code` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileQuery<'a> {
    /// Exact stored path.
    Path(&'a str),
    /// SQL `LIKE` pattern over the stored path; `\` escapes wildcards.
    PathPattern(&'a str),
    /// Exact logical name.
    Fullname(&'a str),
}
