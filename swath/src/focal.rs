//! Moving window (focal) statistics.

use crate::SwathError;
use grid::Raster;
use log::debug;
use rayon::prelude::*;
use std::{fmt, str::FromStr};

/// Aggregate computed over each neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Min,
    Max,
    Mean,
    Range,
    Sum,
    Std,
    Median,
}

impl Statistic {
    pub const ALL: [Self; 7] = [
        Self::Min,
        Self::Max,
        Self::Mean,
        Self::Range,
        Self::Sum,
        Self::Std,
        Self::Median,
    ];

    /// Lowercase name, also used as the base name of the output
    /// raster.
    pub fn name(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Mean => "mean",
            Self::Range => "range",
            Self::Sum => "sum",
            Self::Std => "std",
            Self::Median => "median",
        }
    }

    /// Reduces `values` (all holding data) to a single sample.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn reduce(self, values: &mut [f32]) -> Option<f32> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let value = match self {
            Self::Min => min(values),
            Self::Max => max(values),
            Self::Mean => (sum(values) / n) as f32,
            Self::Range => max(values) - min(values),
            Self::Sum => sum(values) as f32,
            Self::Std => {
                let mean = sum(values) / n;
                let var = values
                    .iter()
                    .map(|v| (f64::from(*v) - mean).powi(2))
                    .sum::<f64>()
                    / n;
                var.sqrt() as f32
            }
            Self::Median => {
                values.sort_unstable_by(f32::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    ((f64::from(values[mid - 1]) + f64::from(values[mid])) / 2.0) as f32
                } else {
                    values[mid]
                }
            }
        };
        Some(value)
    }
}

fn sum(values: &[f32]) -> f64 {
    values.iter().map(|v| f64::from(*v)).sum()
}

fn min(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" | "minimum" => Ok(Self::Min),
            "max" | "maximum" => Ok(Self::Max),
            "mean" => Ok(Self::Mean),
            "range" => Ok(Self::Range),
            "sum" => Ok(Self::Sum),
            "std" => Ok(Self::Std),
            "median" => Ok(Self::Median),
            other => Err(format!("unknown statistic '{other}'")),
        }
    }
}

/// Rectangular neighbourhood measured in cells.
///
/// For even sizes the processing cell sits just right of (below) the
/// center: a width of 4 spans two cells to its left and one to its
/// right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    width: usize,
    height: usize,
}

impl Neighborhood {
    pub fn new(width: usize, height: usize) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Returns the one cell tall neighbourhood scanned across a swath
    /// of `width_m` over cells `cell_size` wide.
    ///
    /// The window spans twice the swath width.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn across_swath(width_m: u32, cell_size: f64) -> Result<Self, SwathError> {
        let width_m = f64::from(width_m);
        let cells = ((2.0 * width_m) / cell_size).floor();
        if cells < 1.0 || !cells.is_finite() {
            return Err(SwathError::WindowTooSmall { width_m, cell_size });
        }
        Ok(Self {
            width: cells as usize,
            height: 1,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells before and after the processing cell along one axis.
    fn reach(size: usize) -> (usize, usize) {
        let before = size / 2;
        (before, size - 1 - before)
    }
}

/// Returns a raster where each cell holds `stat` over the
/// neighbourhood around it, ignoring cells without data.
///
/// Cells whose neighbourhood holds no data are no-data.
pub fn focal_statistics(
    raster: &Raster,
    nbr: Neighborhood,
    stat: Statistic,
) -> Result<Raster, SwathError> {
    let (cols, rows) = raster.dimensions();
    let (left, right) = Neighborhood::reach(nbr.width);
    let (up, down) = Neighborhood::reach(nbr.height);

    let now = std::time::Instant::now();
    let samples: Vec<f32> = (0..rows)
        .into_par_iter()
        .map(|row| {
            let mut window = Vec::with_capacity(nbr.width * nbr.height);
            let row_start = row.saturating_sub(up);
            let row_end = (row + down).min(rows - 1);
            (0..cols)
                .map(|col| {
                    window.clear();
                    let col_start = col.saturating_sub(left);
                    let col_end = (col + right).min(cols - 1);
                    for r in row_start..=row_end {
                        window.extend((col_start..=col_end).filter_map(|c| raster.get(c, r)));
                    }
                    stat.reduce(&mut window).unwrap_or(f32::NAN)
                })
                .collect::<Vec<f32>>()
        })
        .collect::<Vec<Vec<f32>>>()
        .concat();

    debug!(
        "focal; stat: {stat}, window: {}x{}, cells: {}, exec: {:?}",
        nbr.width,
        nbr.height,
        samples.len(),
        now.elapsed()
    );

    Ok(Raster::new(
        raster.origin(),
        raster.cell_size(),
        raster.dimensions(),
        raster.nodata(),
        samples,
    )?)
}

#[cfg(test)]
mod tests {
    use super::{focal_statistics, Neighborhood, Statistic};
    use crate::SwathError;
    use approx::assert_relative_eq;
    use geo::coord;
    use grid::{Raster, DEFAULT_NODATA};

    fn one_row(samples: Vec<f32>) -> Raster {
        let cols = samples.len();
        Raster::new(
            coord!(x: 0.0, y: 1.0),
            (1.0, 1.0),
            (cols, 1),
            DEFAULT_NODATA,
            samples,
        )
        .unwrap()
    }

    fn row_values(raster: &Raster) -> Vec<Option<f32>> {
        raster.row(0).collect()
    }

    #[test]
    fn test_window_cells() {
        let nbr = Neighborhood::across_swath(100, 30.0).unwrap();
        assert_eq!((nbr.width(), nbr.height()), (6, 1));
        let nbr = Neighborhood::across_swath(15, 10.0).unwrap();
        assert_eq!(nbr.width(), 3);
        assert!(matches!(
            Neighborhood::across_swath(4, 10.0),
            Err(SwathError::WindowTooSmall { .. })
        ));
        assert!(Neighborhood::across_swath(0, 1.0).is_err());
    }

    #[test]
    fn test_even_window_reach() {
        assert_eq!(Neighborhood::reach(4), (2, 1));
        assert_eq!(Neighborhood::reach(3), (1, 1));
        assert_eq!(Neighborhood::reach(1), (0, 0));
    }

    #[test]
    fn test_min_max_mean_along_row() {
        let raster = one_row(vec![5.0, 1.0, 9.0, 3.0, 7.0]);
        let nbr = Neighborhood::new(3, 1).unwrap();

        let min = focal_statistics(&raster, nbr, Statistic::Min).unwrap();
        assert_eq!(
            row_values(&min),
            vec![Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]
        );

        let max = focal_statistics(&raster, nbr, Statistic::Max).unwrap();
        assert_eq!(
            row_values(&max),
            vec![Some(5.0), Some(9.0), Some(9.0), Some(9.0), Some(7.0)]
        );

        let mean = focal_statistics(&raster, nbr, Statistic::Mean).unwrap();
        let expected = [3.0, 5.0, 13.0 / 3.0, 19.0 / 3.0, 5.0];
        for (actual, expected) in row_values(&mean).into_iter().zip(expected) {
            assert_relative_eq!(actual.unwrap(), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_nodata_is_ignored() {
        let raster = one_row(vec![f32::NAN, 4.0, f32::NAN, f32::NAN, f32::NAN]);
        let nbr = Neighborhood::new(3, 1).unwrap();
        let mean = focal_statistics(&raster, nbr, Statistic::Mean).unwrap();
        assert_eq!(
            row_values(&mean),
            vec![Some(4.0), Some(4.0), Some(4.0), None, None]
        );
    }

    #[test]
    fn test_height_one_keeps_rows_apart() {
        let raster = Raster::new(
            coord!(x: 0.0, y: 2.0),
            (1.0, 1.0),
            (3, 2),
            DEFAULT_NODATA,
            vec![1.0, 1.0, 1.0, 50.0, 50.0, 50.0],
        )
        .unwrap();
        let nbr = Neighborhood::new(3, 1).unwrap();
        let max = focal_statistics(&raster, nbr, Statistic::Max).unwrap();
        assert_eq!(max.get(1, 0), Some(1.0));
        assert_eq!(max.get(1, 1), Some(50.0));
    }

    #[test]
    fn test_other_statistics() {
        let mut values = [4.0_f32, 1.0, 3.0, 2.0];
        assert_eq!(Statistic::Range.reduce(&mut values), Some(3.0));
        assert_eq!(Statistic::Sum.reduce(&mut values), Some(10.0));
        assert_eq!(Statistic::Median.reduce(&mut values), Some(2.5));
        assert_eq!(
            Statistic::Median.reduce(&mut [5.0_f32, 1.0, 3.0]),
            Some(3.0)
        );
        assert_relative_eq!(
            Statistic::Std.reduce(&mut values).unwrap(),
            1.25_f32.sqrt(),
            epsilon = 1e-6
        );
        assert_eq!(Statistic::Mean.reduce(&mut []), None);
    }

    #[test]
    fn test_parse_statistic() {
        assert_eq!("MINIMUM".parse::<Statistic>().unwrap(), Statistic::Min);
        assert_eq!("max".parse::<Statistic>().unwrap(), Statistic::Max);
        assert!("mode".parse::<Statistic>().is_err());
        for stat in Statistic::ALL {
            assert_eq!(stat.name().parse::<Statistic>().unwrap(), stat);
        }
    }
}
