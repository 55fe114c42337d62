//! Core pipeline for rendering geotagged posts over a georeferenced raster.
//!
//! Points are loaded and split into time-of-day buckets, the raster is
//! percentile-stretched into an RGB background, and both are composed into an
//! interactive figure written out as a single HTML page.

pub mod math;
pub mod points;
pub mod prelude;
pub mod raster;
pub mod scene;
pub mod telemetry;

pub use prelude::{LoadError, PlotlyJs, RasterError, SceneConfig, SceneError};
