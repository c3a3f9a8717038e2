use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::FileQuery;
use super::naming::{self, escape_like, is_identifier};
use super::schema::{self, SCHEMA, STORE_FORMAT_VERSION};
use crate::codec;
use crate::config::Layout;
use crate::error::{Error, Result};
use crate::types::*;

const MEMORY_LOCATION: &str = ":memory:";

/// The only component that talks SQL.
///
/// A store owns one connection and is meant to be used from one thread.
/// Writers (bundling, compiling) assume exclusive access for their duration.
pub struct SqliteStore {
    conn: Connection,
    layout: Layout,
    authority: Authority,
}

impl SqliteStore {
    /// Opens a database file, creating it when missing.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Opens an existing store. Missing files are rejected before SQLite
    /// gets a chance to create an empty database.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if !db_path.is_file() {
            return Err(Error::UnsupportedStore(db_path.to_path_buf()));
        }
        Self::new(db_path)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an open connection. A store written by [`initialize`] reads
    /// paths with the layout it was bundled with; anything else starts from
    /// the default layout.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let mut store = Self {
            conn,
            layout: Layout::default(),
            authority: Authority::Source,
        };
        if let Some(layout) = store.stored_layout()? {
            debug!(?layout, "using stored layout");
            store.layout = layout;
        }
        Ok(store)
    }

    fn stored_layout(&self) -> Result<Option<Layout>> {
        if !self.has_table("sqlbundle")? {
            return Ok(None);
        }
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM sqlbundle WHERE field = 'layout'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        stored.map(|toml| Layout::from_toml_str(&toml)).transpose()
    }

    /// Replaces the layout. Stores already bundled should keep the one
    /// [`from_connection`] loaded.
    ///
    /// [`from_connection`]: SqliteStore::from_connection
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Makes the compiled table for `magic` authoritative for [`resolve`],
    /// provided the store marks it complete. Otherwise source stays
    /// authoritative.
    ///
    /// [`resolve`]: SqliteStore::resolve
    pub fn with_platform(mut self, magic: MagicNumber) -> Result<Self> {
        self.authority = if self.get_magic_numbers()?.contains_key(&magic) {
            Authority::Compiled(magic)
        } else {
            Authority::Source
        };
        debug!(table = %self.authority.table_name(), "selected authoritative table");
        Ok(self)
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the underlying database connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// On-disk location of the main database, or `:memory:`.
    pub fn location(&self) -> Result<String> {
        let file: Option<String> = self
            .conn
            .query_row("PRAGMA database_list", [], |row| row.get(2))
            .optional()?;
        Ok(match file {
            Some(file) if !file.is_empty() => file,
            _ => MEMORY_LOCATION.to_string(),
        })
    }

    /// Runs `f` inside one transaction; any error rolls everything back.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        let created = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        self.conn.execute(
            "INSERT INTO sqlbundle (field, value)
             VALUES ('version', ?1), ('creation_date', ?2), ('layout', ?3)",
            params![STORE_FORMAT_VERSION, created, self.layout.to_toml_string()?],
        )?;
        Ok(())
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn has_table(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get_store_metadata(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT field, value FROM sqlbundle ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Writes

    pub fn add_file(&self, root: &Path, relative: &Path) -> Result<()> {
        let path = naming::posix_path(relative)?;
        let (fullname, is_package) = naming::module_name(&path, &self.layout);
        let contents = std::fs::read(root.join(relative))?;
        self.insert_entry(
            "code",
            &CodeEntry {
                fullname,
                path,
                is_package,
                contents,
            },
        )
    }

    /// Records a namespace package: a directory with importable descendants
    /// and no init file.
    pub fn add_directory(&self, relative: &Path) -> Result<()> {
        let path = naming::posix_path(relative)?;
        self.insert_entry(
            "code",
            &CodeEntry {
                fullname: naming::dotted(&path),
                path,
                is_package: true,
                contents: Vec::new(),
            },
        )
    }

    pub fn create_compiled_table(&self, magic: MagicNumber) -> Result<()> {
        self.conn.execute_batch(&schema::compiled_table(magic))?;
        Ok(())
    }

    pub fn add_compiled_entry(
        &self,
        magic: MagicNumber,
        fullname: &str,
        path: &str,
        is_package: bool,
        compiled: &[u8],
    ) -> Result<()> {
        self.insert_entry(
            &magic.table_name(),
            &CodeEntry {
                fullname: fullname.to_string(),
                path: path.to_string(),
                is_package,
                contents: compiled.to_vec(),
            },
        )
    }

    pub fn mark_platform_complete(&self, magic: MagicNumber, identifier: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO magic_numbers (magic_number, python_identifier) VALUES (?1, ?2)",
            params![magic.value(), identifier],
        )?;
        Ok(())
    }

    // `table` is either "code" or built from a MagicNumber.
    fn insert_entry(&self, table: &str, entry: &CodeEntry) -> Result<()> {
        let contents = codec::compress(&entry.contents)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {table} (fullname, path, is_package, contents) VALUES (?1, ?2, ?3, ?4)"
            ),
            params![entry.fullname, entry.path, entry.is_package, contents],
        )?;
        Ok(())
    }

    // Reads

    /// Compiled signatures recorded in the store. Stores created without
    /// compiled-code support have no `magic_numbers` table and report none.
    pub fn get_magic_numbers(&self) -> Result<BTreeMap<MagicNumber, String>> {
        if !self.has_table("magic_numbers")? {
            return Ok(BTreeMap::new());
        }
        let mut stmt = self
            .conn
            .prepare("SELECT magic_number, python_identifier FROM magic_numbers")?;
        let mut rows = stmt.query([])?;
        let mut magic_numbers = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let magic = MagicNumber::from_column(row.get(0)?)?;
            magic_numbers.insert(magic, row.get(1)?);
        }
        Ok(magic_numbers)
    }

    pub fn magic_number_records(&self) -> Result<Vec<MagicNumberRecord>> {
        Ok(self
            .get_magic_numbers()?
            .into_iter()
            .map(|(magic_number, platform_identifier)| MagicNumberRecord {
                magic_number,
                platform_identifier,
            })
            .collect())
    }

    /// Looks `fullname` up in the authoritative table. When several rows share
    /// the name, the one with the longest path wins.
    pub fn resolve(&self, fullname: &str) -> Result<Option<StoredModule>> {
        if fullname.is_empty() {
            return Ok(None);
        }
        let table = self.authority.table_name();
        let row: Option<(String, bool, Vec<u8>)> = self
            .conn
            .query_row(
                &format!(
                    "SELECT path, is_package, contents FROM {table}
                     WHERE fullname = ?1 ORDER BY LENGTH(path) DESC LIMIT 1"
                ),
                params![fullname],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((path, is_package, contents)) = row else {
            debug!(fullname, table = %table, "not found");
            return Ok(None);
        };
        let bytes = codec::decompress(&contents)?;
        let content = match self.authority {
            Authority::Source => StoredContent::Source(bytes),
            Authority::Compiled(_) => StoredContent::Compiled(bytes),
        };
        Ok(Some(StoredModule {
            path,
            is_package,
            content,
        }))
    }

    pub fn get_file(&self, query: FileQuery<'_>) -> Result<Vec<u8>> {
        let (condition, value) = match query {
            FileQuery::Path(path) => ("path = ?1", path),
            FileQuery::PathPattern(pattern) => ("path LIKE ?1 ESCAPE '\\'", pattern),
            FileQuery::Fullname(fullname) => ("fullname = ?1", fullname),
        };
        let contents: Option<Vec<u8>> = self
            .conn
            .query_row(
                &format!(
                    "SELECT contents FROM code WHERE {condition}
                     ORDER BY LENGTH(path) DESC LIMIT 1"
                ),
                params![value],
                |row| row.get(0),
            )
            .optional()?;

        match contents {
            Some(contents) => codec::decompress(&contents),
            None => Err(Error::FileNotFoundInStore {
                filename: value.to_string(),
                location: self.location()?,
            }),
        }
    }

    /// Lists the entries directly beneath `prefix` (the store root when
    /// empty): files one level down, plus one segment of every deeper path.
    /// An init file is reported as its package directory.
    pub fn list_directory(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_matches('/');
        let dir = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };

        let mut stmt = self.conn.prepare(
            "SELECT path FROM code
             WHERE substr(path, 1, length(?1)) = ?1
               AND length(path) > length(?1)
               AND instr(substr(path, length(?1) + 1), '/') = 0
             UNION
             SELECT substr(path, 1, length(?1) + instr(substr(path, length(?1) + 1), '/') - 1)
             FROM code
             WHERE substr(path, 1, length(?1)) = ?1
               AND instr(substr(path, length(?1) + 1), '/') > 0",
        )?;
        let rows = stmt.query_map(params![dir], |row| row.get::<_, String>(0))?;

        let init_suffix = format!("/{}", self.layout.init_file);
        let mut entries = BTreeSet::new();
        for path in rows {
            let path = path?;
            let entry = match path.strip_suffix(&init_suffix) {
                Some(package_dir) => package_dir.to_string(),
                None => path,
            };
            entries.insert(entry);
        }
        Ok(entries.into_iter().collect())
    }

    /// Names of the distributions whose metadata is bundled, optionally
    /// restricted to one name.
    pub fn find_distributions(&self, name: Option<&str>) -> Result<Vec<String>> {
        let name_pattern = name.map_or_else(|| "%".to_string(), escape_like);
        let pattern = format!(
            "{name_pattern}-%{}/{}",
            escape_like(&self.layout.dist_info_suffix),
            escape_like(&self.layout.metadata_file)
        );
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM code WHERE path LIKE ?1 ESCAPE '\\' ORDER BY path")?;
        let rows = stmt.query_map(params![pattern], |row| row.get::<_, String>(0))?;

        let mut names: Vec<String> = Vec::new();
        for path in rows {
            let path = path?;
            let Some((directory, _)) = path.split_once('/') else {
                continue;
            };
            if !directory.ends_with(&self.layout.dist_info_suffix) {
                continue;
            }
            let Some((dist_name, _)) = directory.split_once('-') else {
                continue;
            };
            if is_identifier(dist_name) && !names.iter().any(|n| n == dist_name) {
                names.push(dist_name.to_string());
            }
        }
        Ok(names)
    }

    /// Reads a file from a distribution's metadata directory.
    pub fn read_distribution_file(&self, name: &str, filename: &str) -> Result<Vec<u8>> {
        let pattern = format!(
            "{}-%{}/{}",
            escape_like(name),
            escape_like(&self.layout.dist_info_suffix),
            escape_like(filename)
        );
        self.get_file(FileQuery::PathPattern(&pattern))
    }

    /// Streams every source file in the `code` table. Each call starts a new
    /// cursor, so the scan can be repeated.
    pub fn iter_source_entries<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(SourceEntry) -> Result<()>,
    {
        let pattern = format!("%{}", escape_like(&self.layout.source_suffix));
        let mut stmt = self.conn.prepare(
            "SELECT fullname, path, is_package, contents FROM code
             WHERE path LIKE ?1 ESCAPE '\\' ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![pattern])?;
        while let Some(row) = rows.next()? {
            let contents: Vec<u8> = row.get(3)?;
            f(SourceEntry {
                fullname: row.get(0)?,
                path: row.get(1)?,
                is_package: row.get(2)?,
                source: codec::decompress(&contents)?,
            })?;
        }
        Ok(())
    }

    /// Streams namespace placeholders as `(fullname, path)` pairs: package
    /// rows that are not an init file and carry no contents.
    pub fn iter_namespace_entries<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(String, String) -> Result<()>,
    {
        let init_file = &self.layout.init_file;
        let nested_init = format!("%/{}", escape_like(init_file));
        let mut stmt = self.conn.prepare(
            "SELECT fullname, path, contents FROM code
             WHERE is_package AND path <> ?1 AND path NOT LIKE ?2 ESCAPE '\\'
             ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![init_file, nested_init])?;
        while let Some(row) = rows.next()? {
            let contents: Vec<u8> = row.get(2)?;
            if !codec::decompress(&contents)?.is_empty() {
                continue;
            }
            f(row.get(0)?, row.get(1)?)?;
        }
        Ok(())
    }

    /// Streams the decompressed contents of every distribution metadata file.
    pub fn iter_package_metadata<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(Vec<u8>) -> Result<()>,
    {
        let pattern = format!("%/{}", escape_like(&self.layout.metadata_file));
        let mut stmt = self.conn.prepare(
            "SELECT contents FROM code WHERE path LIKE ?1 ESCAPE '\\' ORDER BY path",
        )?;
        let mut rows = stmt.query(params![pattern])?;
        while let Some(row) = rows.next()? {
            let contents: Vec<u8> = row.get(0)?;
            f(codec::decompress(&contents)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_paths(paths: &[&str]) -> SqliteStore {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        for path in paths {
            let file = temp.path().join(path);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(&file, format!("# {path}\n")).unwrap();
            store.add_file(temp.path(), Path::new(path)).unwrap();
        }
        store
    }

    #[test]
    fn test_initialize_creates_tables() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();

        assert_eq!(
            store.list_tables().unwrap(),
            vec!["code", "magic_numbers", "sqlbundle"]
        );

        let metadata = store.get_store_metadata().unwrap();
        assert_eq!(metadata[0], ("version".to_string(), "1".to_string()));
        assert_eq!(metadata[1].0, "creation_date");
        assert!(metadata[1].1.ends_with('Z'));
        assert_eq!(metadata[2].0, "layout");
        assert_eq!(
            Layout::from_toml_str(&metadata[2].1).unwrap(),
            Layout::default()
        );
    }

    fn lua_layout() -> Layout {
        Layout {
            init_file: "init.lua".to_string(),
            source_suffix: ".lua".to_string(),
            ..Layout::default()
        }
    }

    #[test]
    fn test_reopened_store_keeps_its_layout() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("bundle.db");
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("lib")).unwrap();
        std::fs::write(src.join("lib/init.lua"), "").unwrap();
        std::fs::write(src.join("lib/util.lua"), "x = 1\n").unwrap();

        let store = SqliteStore::new(&db).unwrap().with_layout(lua_layout());
        store.initialize().unwrap();
        store.add_file(&src, Path::new("lib/init.lua")).unwrap();
        store.add_file(&src, Path::new("lib/util.lua")).unwrap();
        drop(store);

        let store = SqliteStore::open(&db).unwrap();
        assert_eq!(store.layout(), &lua_layout());

        let mut sources = Vec::new();
        store
            .iter_source_entries(|entry| {
                sources.push(entry.fullname);
                Ok(())
            })
            .unwrap();
        assert_eq!(sources, vec!["lib", "lib.util"]);

        let mut namespaces = Vec::new();
        store
            .iter_namespace_entries(|fullname, _| {
                namespaces.push(fullname);
                Ok(())
            })
            .unwrap();
        assert!(namespaces.is_empty(), "{namespaces:?}");
        assert_eq!(store.list_directory("lib").unwrap(), vec!["lib", "lib/util.lua"]);
    }

    #[test]
    fn test_iter_namespace_entries_skips_init_files() {
        let store = store_with_paths(&["pkg/__init__.py", "__init__.py", "ns/plugin/__init__.py"]);
        store.add_directory(Path::new("ns")).unwrap();

        let mut seen = Vec::new();
        store
            .iter_namespace_entries(|fullname, path| {
                seen.push((fullname, path));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![("ns".to_string(), "ns".to_string())]);
    }

    #[test]
    fn test_open_missing_store() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.db");
        let result = SqliteStore::open(&missing);
        assert!(matches!(result, Err(Error::UnsupportedStore(p)) if p == missing));
        assert!(!missing.exists());
    }

    #[test]
    fn test_add_file_naming() {
        let store = store_with_paths(&["pkg/__init__.py", "pkg/mod.py", "pkg/data.txt"]);

        let pkg = store.resolve("pkg").unwrap().unwrap();
        assert!(pkg.is_package);
        assert_eq!(pkg.path, "pkg/__init__.py");

        let module = store.resolve("pkg.mod").unwrap().unwrap();
        assert!(!module.is_package);
        assert_eq!(
            module.content,
            StoredContent::Source(b"# pkg/mod.py\n".to_vec())
        );

        assert!(store.resolve("").unwrap().is_none());
        assert!(store.resolve("pkg.data").unwrap().is_none());
    }

    #[test]
    fn test_resolve_prefers_longest_path() {
        let store = store_with_paths(&["legacy.py"]);
        store
            .insert_entry(
                "code",
                &CodeEntry {
                    fullname: "legacy".to_string(),
                    path: "legacy/__init__.py".to_string(),
                    is_package: true,
                    contents: b"new".to_vec(),
                },
            )
            .unwrap();

        let resolved = store.resolve("legacy").unwrap().unwrap();
        assert_eq!(resolved.path, "legacy/__init__.py");
        assert!(resolved.is_package);
    }

    #[test]
    fn test_resolution_priority_compiled_over_source() {
        let store = store_with_paths(&["m.py"]);
        let magic = MagicNumber::new(7);
        store.create_compiled_table(magic).unwrap();
        store
            .add_compiled_entry(magic, "m", "m.py", false, b"compiled")
            .unwrap();

        // Not marked complete yet: source stays authoritative.
        let store = store.with_platform(magic).unwrap();
        assert_eq!(store.authority(), Authority::Source);

        store.mark_platform_complete(magic, "test 1.0").unwrap();
        let store = store.with_platform(magic).unwrap();
        assert_eq!(store.authority(), Authority::Compiled(magic));

        let resolved = store.resolve("m").unwrap().unwrap();
        assert_eq!(resolved.content, StoredContent::Compiled(b"compiled".to_vec()));

        let other = store.with_platform(MagicNumber::new(8)).unwrap();
        assert!(!other.resolve("m").unwrap().unwrap().content.is_compiled());
    }

    #[test]
    fn test_get_file_not_found_in_memory() {
        let store = store_with_paths(&[]);
        let err = store
            .get_file(FileQuery::Path("does/not/exist"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("does/not/exist"));
        assert!(message.contains(":memory:"));
    }

    #[test]
    fn test_get_file_not_found_on_disk() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("bundle.db");
        let store = SqliteStore::new(&db_path).unwrap();
        store.initialize().unwrap();

        match store.get_file(FileQuery::Fullname("nope")) {
            Err(Error::FileNotFoundInStore { filename, location }) => {
                assert_eq!(filename, "nope");
                assert!(location.ends_with("bundle.db"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_get_file_by_path_and_pattern() {
        let store = store_with_paths(&["pkg/__init__.py", "pkg/resource.txt"]);
        assert_eq!(
            store.get_file(FileQuery::Path("pkg/resource.txt")).unwrap(),
            b"# pkg/resource.txt\n"
        );
        assert_eq!(
            store.get_file(FileQuery::PathPattern("pkg/%.txt")).unwrap(),
            b"# pkg/resource.txt\n"
        );
        assert_eq!(
            store.get_file(FileQuery::Fullname("pkg")).unwrap(),
            b"# pkg/__init__.py\n"
        );
    }

    #[test]
    fn test_list_directory() {
        let store = store_with_paths(&["pkg/a.py", "pkg/sub/b.py", "pkg/sub/__init__.py"]);
        assert_eq!(
            store.list_directory("pkg").unwrap(),
            vec!["pkg/a.py", "pkg/sub"]
        );
        assert_eq!(
            store.list_directory("pkg/sub/").unwrap(),
            vec!["pkg/sub", "pkg/sub/b.py"]
        );
        assert_eq!(store.list_directory("").unwrap(), vec!["pkg"]);
        assert!(store.list_directory("missing").unwrap().is_empty());
    }

    #[test]
    fn test_list_directory_does_not_match_sibling_prefixes() {
        let store = store_with_paths(&["pkg/a.py", "pkg_extra/b.py", "pkgx.py"]);
        assert_eq!(store.list_directory("pkg").unwrap(), vec!["pkg/a.py"]);
        assert_eq!(
            store.list_directory("").unwrap(),
            vec!["pkg", "pkg_extra", "pkgx.py"]
        );
    }

    #[test]
    fn test_list_directory_unicode_segments() {
        let store = store_with_paths(&["あ/い/う.py", "あ/え.py"]);
        assert_eq!(
            store.list_directory("あ").unwrap(),
            vec!["あ/い", "あ/え.py"]
        );
    }

    #[test]
    fn test_namespace_directory() {
        let store = store_with_paths(&["ns/plugin/__init__.py"]);
        store.add_directory(Path::new("ns")).unwrap();

        let ns = store.resolve("ns").unwrap().unwrap();
        assert!(ns.is_package);
        assert_eq!(ns.content, StoredContent::Source(Vec::new()));
        assert_eq!(store.list_directory("").unwrap(), vec!["ns"]);
        assert_eq!(store.list_directory("ns").unwrap(), vec!["ns/plugin"]);
    }

    #[test]
    fn test_find_distributions() {
        let store = store_with_paths(&[
            "demo-1.0.dist-info/METADATA",
            "demo-1.0.dist-info/RECORD",
            "other_pkg-2.0.dist-info/METADATA",
            "9lives-0.1.dist-info/METADATA",
            "nested/inner-1.0.dist-info/METADATA",
        ]);

        assert_eq!(
            store.find_distributions(None).unwrap(),
            vec!["demo", "other_pkg"]
        );
        assert_eq!(store.find_distributions(Some("demo")).unwrap(), vec!["demo"]);
        assert_eq!(
            store.find_distributions(Some("other_pkg")).unwrap(),
            vec!["other_pkg"]
        );
        // `_` must not act as a wildcard.
        assert!(store.find_distributions(Some("other-pkg")).unwrap().is_empty());
        assert!(store.find_distributions(Some("missing")).unwrap().is_empty());

        assert_eq!(
            store.read_distribution_file("demo", "RECORD").unwrap(),
            b"# demo-1.0.dist-info/RECORD\n"
        );
        let err = store.read_distribution_file("demo", "bogus").unwrap_err();
        assert!(err.to_string().contains("demo"));
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_iter_source_entries_is_restartable() {
        let store = store_with_paths(&["pkg/__init__.py", "pkg/mod.py", "pkg/data.txt"]);

        for _ in 0..2 {
            let mut seen = Vec::new();
            store
                .iter_source_entries(|entry| {
                    seen.push((entry.fullname, entry.is_package, entry.source));
                    Ok(())
                })
                .unwrap();
            assert_eq!(
                seen,
                vec![
                    ("pkg".to_string(), true, b"# pkg/__init__.py\n".to_vec()),
                    ("pkg.mod".to_string(), false, b"# pkg/mod.py\n".to_vec()),
                ]
            );
        }
    }

    #[test]
    fn test_iter_package_metadata() {
        let store = store_with_paths(&["a-1.dist-info/METADATA", "a/METADATA.txt"]);
        let mut seen = Vec::new();
        store
            .iter_package_metadata(|bytes| {
                seen.push(bytes);
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![b"# a-1.dist-info/METADATA\n".to_vec()]);
    }

    #[test]
    fn test_magic_numbers_absent_in_old_store() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE code (fullname TEXT, path TEXT, is_package BOOLEAN, contents BLOB);",
        )
        .unwrap();
        let store = SqliteStore::from_connection(conn)
            .unwrap()
            .with_platform(MagicNumber::new(1))
            .unwrap();
        assert!(store.get_magic_numbers().unwrap().is_empty());
        assert_eq!(store.authority(), Authority::Source);
    }

    #[test]
    fn test_duplicate_magic_number_rejected() {
        let store = store_with_paths(&[]);
        let magic = MagicNumber::new(3);
        store.mark_platform_complete(magic, "one").unwrap();
        assert!(matches!(
            store.mark_platform_complete(magic, "two"),
            Err(Error::Database(_))
        ));
        assert_eq!(store.get_magic_numbers().unwrap()[&magic], "one");
    }

    #[test]
    fn test_corrupt_contents() {
        let store = store_with_paths(&["m.py"]);
        store
            .connection()
            .execute("UPDATE code SET contents = x'ffffffff'", [])
            .unwrap();
        assert!(matches!(store.resolve("m"), Err(Error::CorruptData(_))));
    }

    #[test]
    fn test_transaction_rolls_back() {
        let store = store_with_paths(&[]);
        let result: Result<()> = store.transaction(|store| {
            store.add_directory(Path::new("ns"))?;
            Err(Error::Config("abort".to_string()))
        });
        assert!(result.is_err());
        assert!(store.resolve("ns").unwrap().is_none());
    }
}
