use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file not found in store: {filename} ({location})")]
    FileNotFoundInStore { filename: String, location: String },

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("failed to compile {path}: {message}")]
    Compilation { path: String, message: String },

    #[error("store does not exist: {}", .0.display())]
    UnsupportedStore(PathBuf),

    #[error("invalid magic number: {0}")]
    InvalidMagicNumber(i64),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
