mod magic;
mod models;

pub use magic::MagicNumber;
pub use models::*;
