use crate::extension::Extension;
use grid::GridError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwathError {
    #[error("{0} extension unavailable")]
    License(Extension),

    #[error("the profile line layer must be either 1 line, or 1 selected line (found {0})")]
    LineCount(usize),

    #[error("selected line {index} out of {count}")]
    Selection { index: usize, count: usize },

    #[error("profile line has no length")]
    DegenerateLine,

    #[error("invalid swath width {0}")]
    Width(u32),

    #[error("focal window is {width_m} m across but cells are {cell_size} m wide")]
    WindowTooSmall { width_m: f64, cell_size: f64 },

    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("{0} does not overlap the input raster")]
    NoOverlap(&'static str),

    #[error("swath polygon has no centroid")]
    Centroid,

    #[error("profile line does not cross any raster data")]
    EmptyDrape,

    #[error("{0} exists and overwriting is disabled")]
    Exists(PathBuf),

    #[error("invalid geojson: {0}")]
    Json(String),

    #[error("{0}")]
    GeoJson(#[from] geojson::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Grid(#[from] GridError),
}

/// Broad classes of failure reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required extension isn't available.
    License,

    /// The inputs can't describe a swath.
    InvalidInput,

    /// Anything else.
    Unclassified,
}

impl SwathError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::License(_) => ErrorKind::License,
            Self::LineCount(_)
            | Self::Selection { .. }
            | Self::DegenerateLine
            | Self::Width(_)
            | Self::WindowTooSmall { .. } => ErrorKind::InvalidInput,
            _ => ErrorKind::Unclassified,
        }
    }
}
