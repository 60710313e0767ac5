use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("file '{}' does not exist", .0.display())]
    MissingFile(PathBuf),
    #[error("column '{column}' does not exist; available columns: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },
}
