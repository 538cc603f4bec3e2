//! Error types for vecclust

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(
        "{}: record {record} declares {found} elements, expected {expected}",
        path.display()
    )]
    Format {
        path: PathBuf,
        record: usize,
        expected: usize,
        found: usize,
    },

    #[error("{}: record {record} is truncated", path.display())]
    Truncated { path: PathBuf, record: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to read npy array: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    #[error("Failed to write npy array: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),
}

pub type Result<T> = std::result::Result<T, Error>;
