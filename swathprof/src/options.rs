use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use swath::{grid::GridFormat, Extension, Statistic};

/// Compute a swath profile: the minimum, maximum or mean raster value
/// across a band of fixed width along a line.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// GeoJSON file holding the profile line.
    #[arg(short, long)]
    pub line: PathBuf,

    /// Zero based index of the line to use when the file holds more
    /// than one.
    #[arg(long)]
    pub select: Option<usize>,

    /// Full swath width, in meters.
    #[arg(short, long)]
    pub width: u32,

    /// Input raster (`.asc` or `.flt`).
    #[arg(short, long)]
    pub raster: PathBuf,

    /// Statistic computed across the swath.
    #[arg(short, long, default_value_t = Statistic::Mean)]
    pub stat: Statistic,

    /// Directory receiving the outputs; created if missing.
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Also drape the profile line onto the swath raster.
    #[arg(short, long, default_value_t = false)]
    pub interpolate: bool,

    /// Output raster format.
    #[arg(long, value_enum, default_value_t = Format::Asc)]
    pub format: Format,

    /// Refuse to replace existing outputs.
    #[arg(long, default_value_t = false)]
    pub no_overwrite: bool,

    /// Memory map binary float input instead of reading it.
    #[arg(long, default_value_t = false)]
    pub mem_map: bool,

    /// Treat an extension as unavailable.
    #[arg(long, value_enum)]
    pub disable: Vec<Ext>,

    /// Print the draped profile to stdout.
    #[arg(long, value_enum, requires = "interpolate")]
    pub show: Option<Show>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// ESRI ASCII grid.
    Asc,

    /// ESRI binary float grid.
    Flt,
}

impl From<Format> for GridFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Asc => Self::Ascii,
            Format::Flt => Self::Float,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Ext {
    Spatial,
    #[value(name = "3d")]
    ThreeD,
}

impl From<Ext> for Extension {
    fn from(ext: Ext) -> Self {
        match ext {
            Ext::Spatial => Self::Spatial,
            Ext::ThreeD => Self::ThreeD,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Show {
    /// Print distance, x, y and z as CSV.
    Csv,

    /// Print vertices as JSON.
    Json,

    /// Plot to terminal.
    Plot,
}
