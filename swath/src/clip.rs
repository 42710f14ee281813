//! Raster clipping by rectangle and by polygon.

use crate::SwathError;
use geo::{
    geometry::{MultiPolygon, Point, Rect},
    BoundingRect, Intersects,
};
use grid::Raster;
use rayon::prelude::*;

/// Returns the cells of `raster` overlapping `rect`.
///
/// The output is snapped to whole input cells, so it may extend up to
/// one cell beyond `rect` on each side.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn clip_to_rect(raster: &Raster, rect: Rect<f64>) -> Result<Raster, SwathError> {
    let origin = raster.origin();
    let (dx, dy) = raster.cell_size();
    let (cols, rows) = raster.dimensions();

    let col_start = ((rect.min().x - origin.x) / dx).floor().max(0.0);
    let col_end = ((rect.max().x - origin.x) / dx).ceil().min(cols as f64);
    let row_start = ((origin.y - rect.max().y) / dy).floor().max(0.0);
    let row_end = ((origin.y - rect.min().y) / dy).ceil().min(rows as f64);

    if col_end <= col_start || row_end <= row_start {
        return Err(SwathError::NoOverlap("clip rectangle"));
    }

    let start = (col_start as usize, row_start as usize);
    let size = (
        (col_end - col_start) as usize,
        (row_end - row_start) as usize,
    );
    Ok(raster.subgrid(start, size)?)
}

/// Returns a copy of `raster` with every cell whose center falls
/// outside `polygon` set to no-data.
pub fn mask_to_polygon(raster: &Raster, polygon: &MultiPolygon<f64>) -> Result<Raster, SwathError> {
    let (cols, rows) = raster.dimensions();
    let samples: Vec<f32> = (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let center = Point::from(raster.cell_center(col, row));
                    match raster.get(col, row) {
                        Some(value) if polygon.intersects(&center) => value,
                        _ => f32::NAN,
                    }
                })
                .collect::<Vec<f32>>()
        })
        .collect::<Vec<Vec<f32>>>()
        .concat();
    Ok(Raster::new(
        raster.origin(),
        raster.cell_size(),
        raster.dimensions(),
        raster.nodata(),
        samples,
    )?)
}

/// Clips `raster` to the bounding rectangle of `polygon`, then masks
/// out cells outside the polygon itself.
pub fn clip_to_polygon(raster: &Raster, polygon: &MultiPolygon<f64>) -> Result<Raster, SwathError> {
    let rect = polygon
        .bounding_rect()
        .ok_or(SwathError::NoOverlap("empty clip polygon"))?;
    mask_to_polygon(&clip_to_rect(raster, rect)?, polygon)
}
