use crate::{
    buffer::flat_buffer,
    clip::clip_to_polygon,
    context::Context,
    drape::Profile3d,
    extension::Extension,
    focal::{focal_statistics, Neighborhood, Statistic},
    input::select_line,
    math::line_azimuth,
    rotate::{rotate, rotate_onto},
    SwathError,
};
use geo::{
    algorithm::{BoundingRect, Centroid},
    geometry::LineString,
};
use grid::Raster;
use log::debug;
use std::{path::PathBuf, sync::Arc};

/// File name of the draped line.
pub const PROFILE_LINE_3D: &str = "Profile_Line_3D.geojson";

/// Outputs of a swath run.
#[derive(Debug, Clone)]
pub struct SwathProfile {
    /// The swath raster, clipped to the swath polygon.
    pub raster: Arc<Raster>,

    /// Where `raster` was written.
    pub raster_path: PathBuf,

    /// The profile line draped onto `raster`, when requested.
    pub profile: Option<Profile3d>,

    /// Where `profile` was written.
    pub profile_path: Option<PathBuf>,
}

impl SwathProfile {
    pub fn builder() -> SwathParams {
        SwathParams {
            lines: Vec::new(),
            select: None,
            width_m: None,
            statistic: None,
            interpolate: false,
        }
    }
}

pub struct SwathParams {
    /// Candidate profile lines; exactly one must be picked.
    lines: Vec<LineString<f64>>,

    /// Index of the selected line in `lines` (defaults to none, in
    /// which case `lines` must hold a single line).
    select: Option<usize>,

    /// Full swath width in map units (required).
    width_m: Option<u32>,

    /// Statistic computed across the swath (required).
    statistic: Option<Statistic>,

    /// Drape the profile line onto the swath raster (defaults to
    /// false).
    interpolate: bool,
}

impl SwathParams {
    /// Candidate profile lines; exactly one must be picked.
    #[must_use]
    pub fn lines(mut self, lines: Vec<LineString<f64>>) -> Self {
        self.lines = lines;
        self
    }

    /// Index of the selected line.
    #[must_use]
    pub fn select(mut self, index: Option<usize>) -> Self {
        self.select = index;
        self
    }

    /// Full swath width in map units (required).
    #[must_use]
    pub fn width_m(mut self, width: u32) -> Self {
        self.width_m = Some(width);
        self
    }

    /// Statistic computed across the swath (required).
    #[must_use]
    pub fn statistic(mut self, stat: Statistic) -> Self {
        self.statistic = Some(stat);
        self
    }

    /// Drape the profile line onto the swath raster (defaults to
    /// false).
    #[must_use]
    pub fn interpolate(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Computes the swath raster of `raster` along the profile line
    /// and writes it to `ctx`'s workspace.
    ///
    /// Intermediates live in `ctx`'s scratch workspace, which is
    /// purged before returning. Extensions are checked back in on every
    /// path.
    pub fn build(&self, ctx: &Context, raster: &Raster) -> Result<SwathProfile, SwathError> {
        let width_m = self.width_m.ok_or(SwathError::Builder("width_m"))?;
        let stat = self.statistic.ok_or(SwathError::Builder("statistic"))?;

        let scratch = ctx.scratch();
        let _session = scratch.session();
        let now = std::time::Instant::now();

        let _spatial = ctx.extension_registry().check_out(Extension::Spatial)?;
        ctx.message("Spatial Analyst extension successfully checked out.");

        let line = select_line(&self.lines, self.select)?;
        if width_m == 0 {
            return Err(SwathError::Width(width_m));
        }
        let angle = line_azimuth(line)?;
        debug!("swath; azimuth: {angle}, width_m: {width_m}, stat: {stat}");

        let swath = scratch.put_polygon("swath", flat_buffer(line, f64::from(width_m) / 2.0)?);
        ctx.message("Swath created");

        let extent = swath
            .bounding_rect()
            .ok_or(SwathError::NoOverlap("empty swath"))?;
        debug!("swath; extent: {:?} - {:?}", extent.min(), extent.max());
        let pivot = scratch
            .put_point("centroid", swath.centroid().ok_or(SwathError::Centroid)?)
            .0;

        let swath_raster = scratch.put_raster("swath_raster", clip_to_polygon(raster, &swath)?);
        let rotated = scratch.put_raster(
            "rotated_swath_raster",
            rotate(&swath_raster, -angle, pivot)?,
        );

        let nbr = Neighborhood::across_swath(width_m, raster.mean_cell_width())?;
        let focal = scratch.put_raster("focal_raster", focal_statistics(&rotated, nbr, stat)?);
        ctx.message(format!("{stat} statistics complete"));

        let rotated_focal = scratch.put_raster(
            "rotated_focal_raster",
            rotate_onto(&focal, angle, pivot, &swath_raster)?,
        );
        let swath_profile =
            scratch.put_raster("clipped_focal_raster", clip_to_polygon(&rotated_focal, &swath)?);
        ctx.message("Swath raster created");

        // Every output path is resolved before anything is written.
        let raster_path = ctx.output_path(&format!(
            "{}.{}",
            stat.name(),
            ctx.grid_format().extension()
        ))?;

        let (profile, profile_path) = if self.interpolate {
            let _three_d = ctx.extension_registry().check_out(Extension::ThreeD)?;
            ctx.message("3D Analyst extension checked out.");
            let profile = Profile3d::builder()
                .line(line.clone())
                .build(&swath_profile)?;
            let path = ctx.output_path(PROFILE_LINE_3D)?;
            std::fs::write(&path, profile.to_geojson().to_string())?;
            (Some(profile), Some(path))
        } else {
            (None, None)
        };

        swath_profile.save(&raster_path)?;

        debug!(
            "swath; output: {raster_path:?}, scratch: {:?}, exec: {:?}",
            scratch.names(),
            now.elapsed()
        );

        Ok(SwathProfile {
            raster: swath_profile,
            raster_path,
            profile,
            profile_path,
        })
    }
}
