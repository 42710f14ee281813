//! Flat-capped line buffers.

use crate::SwathError;
use geo::{
    geometry::{Coord, Line, LineString, MultiPolygon, Polygon},
    BooleanOps,
};
use std::f64::consts::TAU;

/// Number of vertices approximating a round join.
const JOIN_VERTICES: usize = 64;

/// Returns the polygon covering everything within `distance` of
/// `line`, with flat (butt) ends and round joins between segments.
pub fn flat_buffer(line: &LineString<f64>, distance: f64) -> Result<MultiPolygon<f64>, SwathError> {
    let segments: Vec<Line<f64>> = line
        .lines()
        .filter(|seg| seg.dx() != 0.0 || seg.dy() != 0.0)
        .collect();
    if segments.is_empty() {
        return Err(SwathError::DegenerateLine);
    }

    let mut pieces = segments.iter().map(|seg| segment_rectangle(seg, distance));
    let mut swath = MultiPolygon::new(pieces.next().into_iter().collect());
    for piece in pieces {
        swath = swath.union(&MultiPolygon::new(vec![piece]));
    }
    for seg in &segments[1..] {
        swath = swath.union(&MultiPolygon::new(vec![disc(seg.start, distance)]));
    }
    Ok(swath)
}

/// Rectangle of half-width `distance` around `seg`.
fn segment_rectangle(seg: &Line<f64>, distance: f64) -> Polygon<f64> {
    let len = seg.dx().hypot(seg.dy());
    let normal = Coord {
        x: -seg.dy() / len * distance,
        y: seg.dx() / len * distance,
    };
    Polygon::new(
        LineString::from(vec![
            seg.start + normal,
            seg.end + normal,
            seg.end - normal,
            seg.start - normal,
            seg.start + normal,
        ]),
        vec![],
    )
}

/// Regular polygon approximating a circle.
///
/// Vertices are offset by half a step so none land on the cardinal
/// axes, where they would coincide with the edges of axis aligned
/// segment rectangles.
#[allow(clippy::cast_precision_loss)]
fn disc(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let step = TAU / JOIN_VERTICES as f64;
    let mut ring: Vec<Coord<f64>> = (0..JOIN_VERTICES)
        .map(|i| {
            let (sin, cos) = ((i as f64 + 0.5) * step).sin_cos();
            Coord {
                x: center.x + radius * cos,
                y: center.y + radius * sin,
            }
        })
        .collect();
    ring.push(ring[0]);
    Polygon::new(LineString::from(ring), vec![])
}
