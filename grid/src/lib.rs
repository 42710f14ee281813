//! Georeferenced raster grids.
//!
//! A [Raster] is a north-up grid of `f32` samples with an upper-left
//! origin and a fixed cell size, read from and written to ESRI grid
//! formats.
//!
//! # Formats
//!
//! 1. ESRI ASCII grid (`.asc`), see [ESRI ASCII raster format](https://desktop.arcgis.com/en/arcmap/latest/manage-data/raster-and-images/esri-ascii-raster-format.htm)
//! 1. ESRI binary float grid (`.flt` samples + `.hdr` header)

mod ascii;
mod error;
mod flt;
mod header;

pub use crate::error::GridError;
use byteorder::{BigEndian as BE, ByteOrder, LittleEndian as LE};
use geo::geometry::{Coord, Rect};
use log::debug;
use memmap2::Mmap;
use std::path::Path;

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

/// Value written for cells without data when a raster doesn't
/// specify its own.
pub const DEFAULT_NODATA: f32 = -9999.0;

pub struct Raster {
    /// Upper-left corner of the upper-left cell.
    origin: Coord<C>,

    /// Cell (width, height) in map units.
    cell_size: (C, C),

    /// Number of (columns, rows) in this raster.
    dimensions: (usize, usize),

    /// Sample value marking cells without data.
    nodata: f32,

    /// Samples in row-major order, north row first.
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[f32]>),
    MemMap { raw: Mmap, endian: Endian },
}

/// Byte order of binary samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> f32 {
        match self {
            Self::InMem(samples) => samples[index],
            Self::MemMap { raw, endian } => {
                let start = index * std::mem::size_of::<f32>();
                let bytes = &raw[start..start + std::mem::size_of::<f32>()];
                match endian {
                    Endian::Little => LE::read_f32(bytes),
                    Endian::Big => BE::read_f32(bytes),
                }
            }
        }
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = match self.samples {
            SampleStore::InMem(_) => "in-mem",
            SampleStore::MemMap { .. } => "mem-map",
        };
        f.debug_struct("Raster")
            .field("origin", &self.origin)
            .field("cell_size", &self.cell_size)
            .field("dimensions", &self.dimensions)
            .field("nodata", &self.nodata)
            .field("samples", &storage)
            .finish()
    }
}

/// How to handle raster samples on load.
///
/// Only binary float grids can be memory mapped; ASCII grids are
/// always parsed into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterMode {
    /// Parse samples and load into memory.
    #[default]
    InMem,

    /// Memory map file contents.
    MemMap,
}

/// On-disk grid formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFormat {
    /// ESRI ASCII grid.
    Ascii,

    /// ESRI binary float grid.
    Float,
}

impl GridFormat {
    /// Returns the format implied by `path`'s extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        match path
            .as_ref()
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("asc") => Ok(Self::Ascii),
            Some("flt" | "hdr") => Ok(Self::Float),
            _ => Err(GridError::Format(path.as_ref().to_owned())),
        }
    }

    /// File extension of the primary file.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ascii => "asc",
            Self::Float => "flt",
        }
    }
}

impl Raster {
    /// Returns a new in-memory raster.
    ///
    /// `samples` are row-major, north row first. NaN samples are
    /// treated as no-data.
    pub fn new(
        origin: Coord<C>,
        cell_size: (C, C),
        dimensions: (usize, usize),
        nodata: f32,
        samples: Vec<f32>,
    ) -> Result<Self, GridError> {
        let (cols, rows) = dimensions;
        if cols == 0 || rows == 0 {
            return Err(GridError::Dimensions(cols, rows));
        }
        for size in [cell_size.0, cell_size.1] {
            if !(size.is_finite() && size > 0.0) {
                return Err(GridError::CellSize(size));
            }
        }
        if samples.len() != cols * rows {
            return Err(GridError::SampleCount {
                expected: cols * rows,
                found: samples.len(),
            });
        }
        Ok(Self {
            origin,
            cell_size,
            dimensions,
            nodata,
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Returns a raster read from the file at `path`.
    ///
    /// The format is chosen by file extension.
    pub fn open<P: AsRef<Path>>(path: P, mode: RasterMode) -> Result<Self, GridError> {
        let path = path.as_ref();
        let raster = match GridFormat::from_path(path)? {
            GridFormat::Ascii => {
                if mode == RasterMode::MemMap {
                    debug!("ascii grids can't be mapped, loading {path:?} into memory");
                }
                ascii::read(path)?
            }
            GridFormat::Float => flt::read(path, mode)?,
        };
        debug!(
            "opened {path:?}; dimensions: {:?}, cell_size: {:?}",
            raster.dimensions, raster.cell_size
        );
        Ok(raster)
    }

    /// Writes this raster to `path` in the format implied by its
    /// extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GridError> {
        let path = path.as_ref();
        match GridFormat::from_path(path)? {
            GridFormat::Ascii => ascii::write(self, path),
            GridFormat::Float => flt::write(self, path),
        }
    }

    /// Returns the number of cells in this raster.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (cols, rows) = self.dimensions;
        cols * rows
    }

    /// Returns (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn ncols(&self) -> usize {
        self.dimensions.0
    }

    pub fn nrows(&self) -> usize {
        self.dimensions.1
    }

    /// Upper-left corner of the upper-left cell.
    pub fn origin(&self) -> Coord<C> {
        self.origin
    }

    /// Returns cell (width, height) in map units.
    pub fn cell_size(&self) -> (C, C) {
        self.cell_size
    }

    /// Mean cell width in map units.
    ///
    /// Grids in this crate carry a single width for every column, so
    /// this is simply the cell width.
    pub fn mean_cell_width(&self) -> C {
        self.cell_size.0
    }

    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Returns the rectangle covered by this raster.
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> Rect<C> {
        let (cols, rows) = self.dimensions;
        let (dx, dy) = self.cell_size;
        Rect::new(
            Coord {
                x: self.origin.x,
                y: self.origin.y - rows as C * dy,
            },
            Coord {
                x: self.origin.x + cols as C * dx,
                y: self.origin.y,
            },
        )
    }

    /// Returns the sample at (`col`, `row`), or `None` if out of
    /// bounds or no-data.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        let (cols, rows) = self.dimensions;
        if col < cols && row < rows {
            self.value(self.samples.get_unchecked(row * cols + col))
        } else {
            None
        }
    }

    /// Returns the sample of the cell containing `coord`.
    pub fn get_coord(&self, coord: Coord<C>) -> Option<f32> {
        let (col, row) = self.coord_to_cell(coord)?;
        self.get(col, row)
    }

    /// Returns the center of cell (`col`, `row`).
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, col: usize, row: usize) -> Coord<C> {
        let (dx, dy) = self.cell_size;
        Coord {
            x: self.origin.x + (col as C + 0.5) * dx,
            y: self.origin.y - (row as C + 0.5) * dy,
        }
    }

    /// Returns the (col, row) of the cell containing `coord`, if any.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn coord_to_cell(&self, coord: Coord<C>) -> Option<(usize, usize)> {
        let (fx, fy) = self.fractional_index(coord);
        let (col, row) = ((fx + 0.5).floor(), (fy + 0.5).floor());
        let (cols, rows) = self.dimensions;
        if 0.0 <= col && col < cols as C && 0.0 <= row && row < rows as C {
            Some((col as usize, row as usize))
        } else {
            None
        }
    }

    /// Returns the bilinear interpolated value at `coord`.
    ///
    /// Returns `None` when the cell containing `coord` is outside the
    /// raster or holds no data. Neighbours without data are left out
    /// of the weighted average.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample_bilinear(&self, coord: Coord<C>) -> Option<f32> {
        let (col, row) = self.coord_to_cell(coord)?;
        self.get(col, row)?;

        let (fx, fy) = self.fractional_index(coord);
        let (x0, y0) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - x0, fy - y0);

        let mut sum = 0.0;
        let mut weight = 0.0;
        for (ox, oy, w) in [
            (0.0, 0.0, (1.0 - tx) * (1.0 - ty)),
            (1.0, 0.0, tx * (1.0 - ty)),
            (0.0, 1.0, (1.0 - tx) * ty),
            (1.0, 1.0, tx * ty),
        ] {
            let (x, y) = (x0 + ox, y0 + oy);
            if x < 0.0 || y < 0.0 || w <= 0.0 {
                continue;
            }
            if let Some(value) = self.get(x as usize, y as usize) {
                sum += f64::from(value) * w;
                weight += w;
            }
        }

        if weight > 0.0 {
            Some((sum / weight) as f32)
        } else {
            None
        }
    }

    /// Returns an iterator over all samples, row-major.
    pub fn iter(&self) -> impl Iterator<Item = Option<f32>> + '_ {
        (0..self.len()).map(|index| self.value(self.samples.get_unchecked(index)))
    }

    /// Returns the samples of row `row`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = Option<f32>> + '_ {
        let cols = self.dimensions.0;
        (row * cols..(row + 1) * cols).map(|index| self.value(self.samples.get_unchecked(index)))
    }

    /// Returns the number of cells holding data.
    pub fn valid_count(&self) -> usize {
        self.iter().flatten().count()
    }

    /// Returns the lowest sample in this raster.
    pub fn min_value(&self) -> Option<f32> {
        self.iter().flatten().reduce(f32::min)
    }

    /// Returns the highest sample in this raster.
    pub fn max_value(&self) -> Option<f32> {
        self.iter().flatten().reduce(f32::max)
    }

    /// Returns the `cols` x `rows` block starting at (`col`, `row`)
    /// as a new in-memory raster.
    #[allow(clippy::cast_precision_loss)]
    pub fn subgrid(
        &self,
        (col, row): (usize, usize),
        (cols, rows): (usize, usize),
    ) -> Result<Self, GridError> {
        let (self_cols, self_rows) = self.dimensions;
        if cols == 0 || rows == 0 || col + cols > self_cols || row + rows > self_rows {
            return Err(GridError::Dimensions(cols, rows));
        }
        let (dx, dy) = self.cell_size;
        let origin = Coord {
            x: self.origin.x + col as C * dx,
            y: self.origin.y - row as C * dy,
        };
        let mut samples = Vec::with_capacity(cols * rows);
        for r in row..row + rows {
            samples.extend((col..col + cols).map(|c| self.get(c, r).unwrap_or(f32::NAN)));
        }
        Self::new(origin, self.cell_size, (cols, rows), self.nodata, samples)
    }
}

/// Private API
impl Raster {
    #[allow(clippy::float_cmp)]
    fn value(&self, sample: f32) -> Option<f32> {
        if sample.is_nan() || sample == self.nodata {
            None
        } else {
            Some(sample)
        }
    }

    /// Returns (col, row) as floating point, with cell centers on
    /// whole numbers.
    fn fractional_index(&self, coord: Coord<C>) -> (C, C) {
        let (dx, dy) = self.cell_size;
        (
            (coord.x - self.origin.x) / dx - 0.5,
            (self.origin.y - coord.y) / dy - 0.5,
        )
    }

    /// Returns the sample for writing, with no-data cells mapped to
    /// the raster's no-data value.
    fn raw_or_nodata(&self, index: usize) -> f32 {
        self.value(self.samples.get_unchecked(index))
            .unwrap_or(self.nodata)
    }
}

#[cfg(test)]
pub(crate) fn ramp(cols: usize, rows: usize) -> Raster {
    #[allow(clippy::cast_precision_loss)]
    let samples = (0..cols * rows).map(|i| i as f32).collect();
    Raster::new(
        Coord { x: 100.0, y: 200.0 },
        (10.0, 10.0),
        (cols, rows),
        DEFAULT_NODATA,
        samples,
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::{ramp, Coord, GridError, GridFormat, Raster, DEFAULT_NODATA};
    use approx::assert_relative_eq;

    #[test]
    fn test_new_rejects_bad_sample_count() {
        let err = Raster::new(
            Coord { x: 0.0, y: 0.0 },
            (1.0, 1.0),
            (2, 2),
            DEFAULT_NODATA,
            vec![0.0; 3],
        );
        assert!(matches!(
            err,
            Err(GridError::SampleCount {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn test_bounds_and_centers() {
        let raster = ramp(4, 3);
        let bounds = raster.bounds();
        assert_relative_eq!(bounds.min().x, 100.0);
        assert_relative_eq!(bounds.min().y, 170.0);
        assert_relative_eq!(bounds.max().x, 140.0);
        assert_relative_eq!(bounds.max().y, 200.0);
        assert_eq!(raster.cell_center(0, 0), Coord { x: 105.0, y: 195.0 });
        assert_eq!(raster.cell_center(3, 2), Coord { x: 135.0, y: 175.0 });
    }

    #[test]
    fn test_coord_to_cell() {
        let raster = ramp(4, 3);
        assert_eq!(raster.coord_to_cell(Coord { x: 105.0, y: 195.0 }), Some((0, 0)));
        assert_eq!(raster.coord_to_cell(Coord { x: 139.9, y: 170.1 }), Some((3, 2)));
        assert_eq!(raster.coord_to_cell(Coord { x: 99.9, y: 195.0 }), None);
        assert_eq!(raster.coord_to_cell(Coord { x: 105.0, y: 200.1 }), None);
        assert_eq!(raster.get_coord(Coord { x: 115.0, y: 185.0 }), Some(5.0));
    }

    #[test]
    fn test_nodata_reads_as_none() {
        let raster = Raster::new(
            Coord { x: 0.0, y: 2.0 },
            (1.0, 1.0),
            (2, 2),
            -1.0,
            vec![1.0, -1.0, f32::NAN, 4.0],
        )
        .unwrap();
        assert_eq!(raster.get(0, 0), Some(1.0));
        assert_eq!(raster.get(1, 0), None);
        assert_eq!(raster.get(0, 1), None);
        assert_eq!(raster.get(5, 5), None);
        assert_eq!(raster.valid_count(), 2);
        assert_eq!(raster.min_value(), Some(1.0));
        assert_eq!(raster.max_value(), Some(4.0));
    }

    #[test]
    fn test_bilinear() {
        let raster = ramp(4, 3);
        // Halfway between cells (0, 0) = 0 and (1, 1) = 5.
        let value = raster.sample_bilinear(Coord { x: 110.0, y: 190.0 }).unwrap();
        assert_relative_eq!(value, 2.5);
        // Exactly on a cell center.
        let value = raster.sample_bilinear(Coord { x: 125.0, y: 185.0 }).unwrap();
        assert_relative_eq!(value, 6.0);
        assert_eq!(raster.sample_bilinear(Coord { x: 90.0, y: 190.0 }), None);
    }

    #[test]
    fn test_bilinear_skips_nodata_neighbours() {
        let raster = Raster::new(
            Coord { x: 0.0, y: 2.0 },
            (1.0, 1.0),
            (2, 2),
            DEFAULT_NODATA,
            vec![2.0, f32::NAN, 4.0, f32::NAN],
        )
        .unwrap();
        let value = raster.sample_bilinear(Coord { x: 0.75, y: 1.0 }).unwrap();
        assert_relative_eq!(value, 3.0);
        assert_eq!(raster.sample_bilinear(Coord { x: 1.5, y: 1.5 }), None);
    }

    #[test]
    fn test_subgrid() {
        let raster = ramp(4, 3);
        let sub = raster.subgrid((1, 1), (2, 2)).unwrap();
        assert_eq!(sub.dimensions(), (2, 2));
        assert_eq!(sub.origin(), Coord { x: 110.0, y: 190.0 });
        assert_eq!(
            sub.iter().collect::<Vec<_>>(),
            vec![Some(5.0), Some(6.0), Some(9.0), Some(10.0)]
        );
        assert!(raster.subgrid((3, 0), (2, 1)).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(GridFormat::from_path("a/b.ASC").unwrap(), GridFormat::Ascii);
        assert_eq!(GridFormat::from_path("a/b.flt").unwrap(), GridFormat::Float);
        assert!(GridFormat::from_path("a/b.tif").is_err());
    }
}
