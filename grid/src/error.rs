use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported grid format {0}")]
    Format(PathBuf),

    #[error("missing header field '{0}'")]
    MissingField(&'static str),

    #[error("invalid header line '{0}'")]
    Header(String),

    #[error("invalid sample '{0}'")]
    Sample(String),

    #[error("expected {expected} samples, found {found}")]
    SampleCount { expected: usize, found: usize },

    #[error("invalid dimensions {0}x{1}")]
    Dimensions(usize, usize),

    #[error("invalid cell size {0}")]
    CellSize(f64),
}
