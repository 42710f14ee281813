//! In-memory scratch workspace for intermediate results.

use dashmap::DashMap;
use geo::geometry::{MultiPolygon, Point};
use grid::Raster;
use log::debug;
use std::sync::Arc;

/// An intermediate result.
#[derive(Clone)]
pub enum Artifact {
    Raster(Arc<Raster>),
    Polygon(Arc<MultiPolygon<f64>>),
    Point(Point<f64>),
}

/// Named intermediate results of a single run.
///
/// Everything stored here is dropped by [`Scratch::purge`], which a
/// [`ScratchSession`] calls when it goes out of scope.
#[derive(Default)]
pub struct Scratch {
    items: DashMap<String, Artifact>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `raster` under `name`, replacing any previous entry.
    pub fn put_raster(&self, name: &str, raster: Raster) -> Arc<Raster> {
        let raster = Arc::new(raster);
        debug!(
            "scratch; {name}: {}x{} raster",
            raster.ncols(),
            raster.nrows()
        );
        self.items
            .insert(name.to_owned(), Artifact::Raster(Arc::clone(&raster)));
        raster
    }

    /// Stores `polygon` under `name`, replacing any previous entry.
    pub fn put_polygon(&self, name: &str, polygon: MultiPolygon<f64>) -> Arc<MultiPolygon<f64>> {
        let polygon = Arc::new(polygon);
        debug!("scratch; {name}: {} part polygon", polygon.0.len());
        self.items
            .insert(name.to_owned(), Artifact::Polygon(Arc::clone(&polygon)));
        polygon
    }

    /// Stores `point` under `name`, replacing any previous entry.
    pub fn put_point(&self, name: &str, point: Point<f64>) -> Point<f64> {
        debug!("scratch; {name}: {point:?}");
        self.items.insert(name.to_owned(), Artifact::Point(point));
        point
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<Artifact> {
        self.items.get(name).map(|entry| entry.value().clone())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.items.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Drops every stored artifact.
    pub fn purge(&self) {
        debug!("scratch; purging {} artifacts", self.items.len());
        self.items.clear();
    }

    /// Returns a guard that purges this workspace when dropped.
    pub fn session(&self) -> ScratchSession<'_> {
        ScratchSession { scratch: self }
    }
}

/// Purges its [Scratch] on drop.
#[must_use]
pub struct ScratchSession<'a> {
    scratch: &'a Scratch,
}

impl Drop for ScratchSession<'_> {
    fn drop(&mut self) {
        self.scratch.purge();
    }
}

#[cfg(test)]
mod tests {
    use super::{Artifact, Scratch};
    use geo::{coord, point, MultiPolygon};
    use grid::{Raster, DEFAULT_NODATA};

    #[test]
    fn test_session_purges() {
        let scratch = Scratch::new();
        {
            let _session = scratch.session();
            let raster = Raster::new(
                coord!(x: 0.0, y: 1.0),
                (1.0, 1.0),
                (1, 1),
                DEFAULT_NODATA,
                vec![1.0],
            )
            .unwrap();
            let kept = scratch.put_raster("swath_raster", raster);
            scratch.put_polygon("swath", MultiPolygon::new(vec![]));
            scratch.put_point("centroid", point!(x: 1.0, y: 2.0));
            assert_eq!(scratch.names(), vec!["centroid", "swath", "swath_raster"]);
            assert!(matches!(scratch.get("centroid"), Some(Artifact::Point(_))));
            // Handles outlive the scratch entry.
            assert_eq!(kept.get(0, 0), Some(1.0));
        }
        assert!(scratch.is_empty());
    }
}
