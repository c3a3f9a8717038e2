//! The compiled-code boundary between a store and the runtime that executes
//! its modules.

pub mod literal;

pub use literal::LiteralPlatform;

use crate::error::Result;
use crate::types::MagicNumber;

/// A runtime able to turn stored source into its native compiled form and
/// back.
///
/// Compiled bytes are only meaningful to a platform reporting the same
/// [`MagicNumber`], which is why stores keep one compiled table per number.
pub trait Platform {
    /// A compiled unit, ready to execute.
    type Code;

    fn magic_number(&self) -> MagicNumber;

    /// Human-readable interpreter family and version, recorded next to the
    /// magic number.
    fn identifier(&self) -> String;

    /// Fails with [`Error::Compilation`](crate::error::Error::Compilation) on
    /// invalid source.
    fn compile(&self, source: &[u8], path: &str) -> Result<Self::Code>;

    /// Fails with [`Error::Compilation`](crate::error::Error::Compilation)
    /// when the unit has no byte representation.
    fn serialize(&self, code: &Self::Code) -> Result<Vec<u8>>;

    /// Fails with [`Error::CorruptData`](crate::error::Error::CorruptData)
    /// when the bytes were not produced by [`Platform::serialize`].
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Code>;
}
