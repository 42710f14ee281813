mod buffer;
mod clip;
mod context;
mod drape;
mod error;
mod extension;
mod focal;
mod input;
pub mod math;
mod pipeline;
mod rotate;
mod scratch;

pub use crate::{
    buffer::flat_buffer,
    clip::{clip_to_polygon, clip_to_rect, mask_to_polygon},
    context::Context,
    drape::{Profile3d, Profile3dBuilder, Vertex},
    error::{ErrorKind, SwathError},
    extension::{Checkout, Extension, Extensions},
    focal::{focal_statistics, Neighborhood, Statistic},
    input::{parse_lines, read_lines, select_line},
    math::line_azimuth,
    pipeline::{SwathParams, SwathProfile, PROFILE_LINE_3D},
    rotate::{rotate, rotate_onto},
    scratch::{Artifact, Scratch, ScratchSession},
};
pub use geo;
pub use grid;
