use crate::{math::linspace, SwathError};
use geo::geometry::{Coord, LineString};
use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};
use grid::Raster;
use log::debug;
use serde::Serialize;

/// A vertex of a line draped onto a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,

    /// Surface value under (`x`, `y`).
    pub z: f32,

    /// Distance along the line from its first vertex, in map units.
    pub distance: f64,
}

/// A line interpolated onto a raster surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile3d {
    /// Length of the source line in map units.
    pub length: f64,

    /// Vertices over cells holding data.
    pub vertices: Vec<Vertex>,
}

impl Profile3d {
    pub fn builder() -> Profile3dBuilder {
        Profile3dBuilder {
            line: None,
            step_size: None,
        }
    }

    /// Returns this profile as a GeoJSON feature with 3D positions.
    pub fn to_geojson(&self) -> GeoJson {
        let coordinates = self
            .vertices
            .iter()
            .map(|v| vec![v.x, v.y, f64::from(v.z)])
            .collect();
        let mut properties = JsonObject::new();
        properties.insert("length".to_owned(), self.length.into());
        properties.insert("vertices".to_owned(), self.vertices.len().into());
        GeoJson::Feature(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(coordinates))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

pub struct Profile3dBuilder {
    /// Line to drape (required).
    line: Option<LineString<f64>>,

    /// Maximum distance between vertices (defaults to the surface's
    /// cell size).
    step_size: Option<f64>,
}

impl Profile3dBuilder {
    /// Line to drape (required).
    #[must_use]
    pub fn line(mut self, line: LineString<f64>) -> Self {
        self.line = Some(line);
        self
    }

    /// Maximum distance between vertices (defaults to the surface's
    /// cell size).
    #[must_use]
    pub fn step_size(mut self, step: f64) -> Self {
        self.step_size = Some(step);
        self
    }

    /// Densifies the line, keeping its own vertices, and reads a
    /// bilinear `z` for each vertex from `surface`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn build(&self, surface: &Raster) -> Result<Profile3d, SwathError> {
        let line = self.line.as_ref().ok_or(SwathError::Builder("line"))?;
        let step = self
            .step_size
            .unwrap_or_else(|| surface.mean_cell_width());
        if !(step.is_finite() && step > 0.0) {
            return Err(SwathError::Builder("step_size"));
        }

        let now = std::time::Instant::now();
        let mut vertices = Vec::new();
        let mut walked = 0.0;
        let mut push = |coord: Coord<f64>, distance: f64| {
            if let Some(z) = surface.sample_bilinear(coord) {
                vertices.push(Vertex {
                    x: coord.x,
                    y: coord.y,
                    z,
                    distance,
                });
            }
        };

        if let Some(first) = line.0.first() {
            push(*first, 0.0);
        }
        for seg in line.lines() {
            let len = seg.dx().hypot(seg.dy());
            if len == 0.0 {
                continue;
            }
            let n = (len / step).ceil().max(1.0) as usize + 1;
            let xs = linspace(seg.start.x, seg.end.x, n);
            let ys = linspace(seg.start.y, seg.end.y, n);
            let ds = linspace(walked, walked + len, n);
            for ((x, y), d) in xs.zip(ys).zip(ds).skip(1).take(n - 2) {
                push(Coord { x, y }, d);
            }
            walked += len;
            push(seg.end, walked);
        }

        debug!(
            "drape; len: {walked}, vertices: {}, exec: {:?}",
            vertices.len(),
            now.elapsed()
        );

        if vertices.len() < 2 {
            return Err(SwathError::EmptyDrape);
        }
        Ok(Profile3d {
            length: walked,
            vertices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Profile3d;
    use crate::SwathError;
    use approx::assert_relative_eq;
    use geo::{coord, line_string};
    use grid::{Raster, DEFAULT_NODATA};

    /// 20x20 raster of 1m cells where z = 10 * x.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn east_slope() -> Raster {
        let samples = (0..400)
            .map(|i| ((i % 20) as f64 + 0.5) as f32 * 10.0)
            .collect();
        Raster::new(
            coord!(x: 0.0, y: 20.0),
            (1.0, 1.0),
            (20, 20),
            DEFAULT_NODATA,
            samples,
        )
        .unwrap()
    }

    #[test]
    fn test_drape_densifies_at_cell_size() {
        let surface = east_slope();
        let profile = Profile3d::builder()
            .line(line_string![(x: 2.5, y: 10.0), (x: 12.5, y: 10.0)])
            .build(&surface)
            .unwrap();
        assert_relative_eq!(profile.length, 10.0);
        assert_eq!(profile.vertices.len(), 11);
        for (i, vertex) in profile.vertices.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let distance = i as f64;
            assert_relative_eq!(vertex.distance, distance, epsilon = 1e-9);
            assert_relative_eq!(vertex.z, (vertex.x * 10.0) as f32, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_line_vertices_are_kept() {
        let surface = east_slope();
        let profile = Profile3d::builder()
            .line(line_string![(x: 2.0, y: 2.0), (x: 2.0, y: 4.5), (x: 5.0, y: 4.5)])
            .step_size(1.0)
            .build(&surface)
            .unwrap();
        let corner = profile
            .vertices
            .iter()
            .find(|v| v.x == 2.0 && v.y == 4.5)
            .unwrap();
        assert_relative_eq!(corner.distance, 2.5);
        assert_relative_eq!(profile.length, 5.5);
    }

    #[test]
    fn test_vertices_off_the_surface_are_dropped() {
        let surface = east_slope();
        let profile = Profile3d::builder()
            .line(line_string![(x: -5.0, y: 10.0), (x: 5.0, y: 10.0)])
            .build(&surface)
            .unwrap();
        assert!(profile.vertices.iter().all(|v| v.x >= 0.0));

        let outside = Profile3d::builder()
            .line(line_string![(x: 30.0, y: 30.0), (x: 40.0, y: 30.0)])
            .build(&surface);
        assert!(matches!(outside, Err(SwathError::EmptyDrape)));
    }

    #[test]
    fn test_missing_line() {
        assert!(matches!(
            Profile3d::builder().build(&east_slope()),
            Err(SwathError::Builder("line"))
        ));
    }

    #[test]
    fn test_geojson_has_3d_positions() {
        let profile = Profile3d::builder()
            .line(line_string![(x: 2.5, y: 10.0), (x: 4.5, y: 10.0)])
            .build(&east_slope())
            .unwrap();
        let json = profile.to_geojson().to_string();
        assert!(json.contains(r#""type":"LineString""#));
        assert!(json.contains("[2.5,10.0,25.0]"));
    }
}
