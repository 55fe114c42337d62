use crate::prelude::{RasterError, RasterResult, SceneConfig};
use crate::raster::enhance::enhancements_for;
use crate::raster::geotiff::{GeoBounds, Raster};
use crate::raster::normalize::{normalize_band, select_bands};
use crate::telemetry::log::LogManager;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array2;
use std::io::Cursor;
use std::path::Path;

/// Encoded background ready to anchor under the data layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub data_uri: String,
    pub bounds: GeoBounds,
    pub width: u32,
    pub height: u32,
}

/// Builds the RGB image for a raster: a three-band composite when at least
/// three bands exist, otherwise band 1 replicated as grayscale.
pub fn composite(raster: &Raster, config: &SceneConfig) -> RasterResult<RgbImage> {
    let logger = LogManager::new("compositor");
    let width = u32::try_from(raster.width())
        .map_err(|_| RasterError::UnsupportedLayout("raster too wide".into()))?;
    let height = u32::try_from(raster.height())
        .map_err(|_| RasterError::UnsupportedLayout("raster too tall".into()))?;

    if raster.band_count() < 3 {
        let gray = normalize_band(band(raster, 1)?);
        logger.record(&format!("grayscale composite {}x{}", width, height));
        return Ok(RgbImage::from_fn(width, height, |x, y| {
            let v = gray[[y as usize, x as usize]];
            Rgb([v, v, v])
        }));
    }

    let bands = select_bands(config.bands, raster.band_count());
    if bands != config.bands {
        logger.warn(&format!(
            "band selection {:?} exceeds {} available bands, using {:?}",
            config.bands,
            raster.band_count(),
            bands
        ));
    }
    let channels = bands
        .iter()
        .map(|&index| band(raster, index).map(normalize_band))
        .collect::<RasterResult<Vec<Array2<u8>>>>()?;

    let mut image = RgbImage::from_fn(width, height, |x, y| {
        let at = [y as usize, x as usize];
        Rgb([channels[0][at], channels[1][at], channels[2][at]])
    });
    for enhancement in enhancements_for(config) {
        enhancement.apply(&mut image);
    }
    logger.record(&format!(
        "composite {}x{} from bands {:?} (enhance: {})",
        width, height, bands, config.enhance
    ));
    Ok(image)
}

fn band(raster: &Raster, index: usize) -> RasterResult<&Array2<f64>> {
    raster
        .band(index)
        .ok_or_else(|| RasterError::UnsupportedLayout(format!("band {} missing", index)))
}

pub fn encode_png(image: &RgbImage) -> RasterResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// PNG-encodes the image as a `data:image/png;base64,...` URI.
pub fn encode_data_uri(image: &RgbImage) -> RasterResult<String> {
    let png = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Loads, composites and encodes the background raster. Every failure is
/// logged and turned into `None` so the scene renders without a basemap.
pub fn prepare_background(path: &Path, config: &SceneConfig) -> Option<Background> {
    let logger = LogManager::new("compositor");
    if !path.exists() {
        logger.warn(&format!(
            "background raster {} not found, rendering without it",
            path.display()
        ));
        return None;
    }
    match build_background(path, config) {
        Ok(background) => Some(background),
        Err(err) => {
            logger.warn(&format!(
                "background raster {} unusable: {}",
                path.display(),
                err
            ));
            None
        }
    }
}

fn build_background(path: &Path, config: &SceneConfig) -> RasterResult<Background> {
    let raster = Raster::open(path)?;
    let bounds = raster.bounds().ok_or(RasterError::MissingGeoreference)?;
    let image = composite(&raster, config)?;
    let data_uri = encode_data_uri(&image)?;
    Ok(Background {
        data_uri,
        bounds,
        width: image.width(),
        height: image.height(),
    })
}
