pub mod compositor;
pub mod enhance;
pub mod geotiff;
pub mod normalize;

pub use compositor::{composite, encode_data_uri, prepare_background, Background};
pub use enhance::{Brightness, Contrast, Enhancement};
pub use geotiff::{GeoBounds, Raster};
pub use normalize::{normalize_band, select_bands};
