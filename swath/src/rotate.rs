//! Raster rotation with bilinear resampling.

use crate::{math::rotate_cw, SwathError};
use geo::geometry::Coord;
use grid::Raster;
use log::debug;
use rayon::prelude::*;

/// Returns `raster` rotated clockwise by `degrees` about `pivot`.
///
/// The output keeps the input cell size and is sized to the bounding
/// rectangle of the rotated input extent. Cells that map outside the
/// input are no-data.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rotate(raster: &Raster, degrees: f64, pivot: Coord<f64>) -> Result<Raster, SwathError> {
    let bounds = raster.bounds();
    let corners = [
        bounds.min(),
        Coord {
            x: bounds.min().x,
            y: bounds.max().y,
        },
        bounds.max(),
        Coord {
            x: bounds.max().x,
            y: bounds.min().y,
        },
    ]
    .map(|corner| rotate_cw(corner, degrees, pivot));

    let (min_x, max_x, min_y, max_y) = corners.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(min_x, max_x, min_y, max_y), c| {
            (min_x.min(c.x), max_x.max(c.x), min_y.min(c.y), max_y.max(c.y))
        },
    );

    let (dx, dy) = raster.cell_size();
    // Shave a hair off so exact multiples of the cell size don't grow
    // an extra column or row from rounding noise.
    let cols = ((max_x - min_x) / dx - 1e-9).ceil().max(1.0) as usize;
    let rows = ((max_y - min_y) / dy - 1e-9).ceil().max(1.0) as usize;
    let origin = Coord { x: min_x, y: max_y };

    debug!("rotate; degrees: {degrees}, pivot: {pivot:?}, output: {cols}x{rows}");
    resample(raster, degrees, pivot, origin, (cols, rows))
}

/// Rotates `raster` clockwise by `degrees` about `pivot`, resampling
/// onto the grid of `template`.
pub fn rotate_onto(
    raster: &Raster,
    degrees: f64,
    pivot: Coord<f64>,
    template: &Raster,
) -> Result<Raster, SwathError> {
    if template.cell_size() != raster.cell_size() {
        debug!(
            "rotate_onto; resampling from {:?} to {:?} cells",
            raster.cell_size(),
            template.cell_size()
        );
    }
    resample_grid(
        raster,
        degrees,
        pivot,
        template.origin(),
        template.cell_size(),
        template.dimensions(),
    )
}

fn resample(
    raster: &Raster,
    degrees: f64,
    pivot: Coord<f64>,
    origin: Coord<f64>,
    dimensions: (usize, usize),
) -> Result<Raster, SwathError> {
    resample_grid(
        raster,
        degrees,
        pivot,
        origin,
        raster.cell_size(),
        dimensions,
    )
}

/// Fills the described output grid by rotating each output cell
/// center back into `raster` and sampling bilinearly.
#[allow(clippy::cast_precision_loss)]
fn resample_grid(
    raster: &Raster,
    degrees: f64,
    pivot: Coord<f64>,
    origin: Coord<f64>,
    (dx, dy): (f64, f64),
    (cols, rows): (usize, usize),
) -> Result<Raster, SwathError> {
    let samples: Vec<f32> = (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let center = Coord {
                        x: origin.x + (col as f64 + 0.5) * dx,
                        y: origin.y - (row as f64 + 0.5) * dy,
                    };
                    let source = rotate_cw(center, -degrees, pivot);
                    raster.sample_bilinear(source).unwrap_or(f32::NAN)
                })
                .collect::<Vec<f32>>()
        })
        .collect::<Vec<Vec<f32>>>()
        .concat();
    Ok(Raster::new(
        origin,
        (dx, dy),
        (cols, rows),
        raster.nodata(),
        samples,
    )?)
}
