use crate::SwathError;
use geo::geometry::LineString;

/// Returns the bearing, in degrees clockwise from north, from the
/// first to the last vertex of `line`.
///
/// Intermediate vertices are ignored.
pub fn line_azimuth(line: &LineString<f64>) -> Result<f64, SwathError> {
    let (first, last) = match (line.0.first(), line.0.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(SwathError::DegenerateLine),
    };
    let (dx, dy) = (last.x - first.x, last.y - first.y);
    if dx == 0.0 && dy == 0.0 {
        return Err(SwathError::DegenerateLine);
    }
    Ok(dx.atan2(dy).to_degrees())
}
