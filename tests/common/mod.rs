use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A source tree on disk plus a path for the database built from it.
pub struct Fixture {
    pub temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        std::fs::create_dir(temp_dir.path().join("src")).expect("create src dir");
        Self { temp_dir }
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let fixture = Self::new();
        for (path, content) in files {
            fixture.write(path, content);
        }
        fixture
    }

    pub fn write(&self, path: &str, content: &str) {
        let file = self.source_dir().join(path);
        std::fs::create_dir_all(file.parent().expect("parent dir")).expect("create dirs");
        std::fs::write(file, content).expect("write file");
    }

    pub fn source_dir(&self) -> PathBuf {
        self.temp_dir.path().join("src")
    }

    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("bundle.db")
    }

    #[allow(dead_code)]
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}
