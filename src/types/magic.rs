use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Integer signature of a compiled-code format and the interpreter revision
/// that produced it.
///
/// Compiled tables are named from this value. SQLite cannot bind table names
/// as parameters, so the name is only ever formatted from the integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MagicNumber(u32);

impl MagicNumber {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn from_column(value: i64) -> Result<Self> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| Error::InvalidMagicNumber(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn table_name(self) -> String {
        format!("bytecode_{}", self.0)
    }
}

impl fmt::Display for MagicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
