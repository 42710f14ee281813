mod azimuth;
mod linspace;
mod rotation;

pub use azimuth::line_azimuth;
pub(crate) use {linspace::linspace, rotation::rotate_cw};
