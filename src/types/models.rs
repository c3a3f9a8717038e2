use serde::Serialize;

use super::MagicNumber;

/// One row of the `code` table, or of a compiled table, before compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub fullname: String,
    pub path: String,
    pub is_package: bool,
    pub contents: Vec<u8>,
}

/// A source row streamed out of the `code` table with its contents decompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub fullname: String,
    pub path: String,
    pub is_package: bool,
    pub source: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagicNumberRecord {
    pub magic_number: MagicNumber,
    pub platform_identifier: String,
}

/// Decompressed content of a resolved unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredContent {
    /// Source text that still needs compiling.
    Source(Vec<u8>),
    /// A serialized compiled unit for the platform the store was attached to.
    Compiled(Vec<u8>),
}

impl StoredContent {
    pub fn is_compiled(&self) -> bool {
        matches!(self, Self::Compiled(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredModule {
    pub path: String,
    pub is_package: bool,
    pub content: StoredContent,
}

/// The table `resolve` reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Source,
    Compiled(MagicNumber),
}

impl Authority {
    pub fn table_name(&self) -> String {
        match self {
            Self::Source => "code".to_string(),
            Self::Compiled(magic) => magic.table_name(),
        }
    }
}
