//! Profile line input.

use crate::SwathError;
use geo::geometry::{Coord, LineString};
use geojson::{GeoJson, Geometry, Value};
use std::path::Path;

/// Reads every line feature from the GeoJSON file at `path`.
///
/// Features without geometry are skipped. Any geometry other than a
/// `LineString` or single part `MultiLineString` is an error.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<LineString<f64>>, SwathError> {
    let text = std::fs::read_to_string(path)?;
    parse_lines(&text)
}

pub fn parse_lines(text: &str) -> Result<Vec<LineString<f64>>, SwathError> {
    let geojson: GeoJson = text.parse()?;
    let geometries: Vec<Geometry> = match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };
    geometries.iter().map(|g| to_line(&g.value)).collect()
}

/// Resolves the single profile line.
///
/// With a `selection`, that line is picked out of `lines`; without
/// one, `lines` must hold exactly one line.
pub fn select_line(
    lines: &[LineString<f64>],
    selection: Option<usize>,
) -> Result<&LineString<f64>, SwathError> {
    match selection {
        Some(index) => lines.get(index).ok_or(SwathError::Selection {
            index,
            count: lines.len(),
        }),
        None => match lines {
            [line] => Ok(line),
            _ => Err(SwathError::LineCount(lines.len())),
        },
    }
}

fn to_line(value: &Value) -> Result<LineString<f64>, SwathError> {
    let positions = match value {
        Value::LineString(positions) => positions,
        Value::MultiLineString(parts) => match parts.as_slice() {
            [positions] => positions,
            _ => {
                return Err(SwathError::Json(format!(
                    "multipart line with {} parts",
                    parts.len()
                )))
            }
        },
        other => {
            return Err(SwathError::Json(format!(
                "expected a line, found {}",
                type_name(other)
            )))
        }
    };
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(SwathError::Json(format!("invalid position {position:?}"))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
