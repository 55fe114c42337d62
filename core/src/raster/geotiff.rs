use crate::prelude::{RasterError, RasterResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;

/// Geographic extent of a raster in its own coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl GeoBounds {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    fn from_corners(corners: &[(f64, f64)]) -> Self {
        let xs = corners.iter().map(|c| c.0);
        let ys = corners.iter().map(|c| c.1);
        Self {
            left: xs.clone().fold(f64::INFINITY, f64::min),
            right: xs.fold(f64::NEG_INFINITY, f64::max),
            bottom: ys.clone().fold(f64::INFINITY, f64::min),
            top: ys.fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Multi-band sample grid. Bands share one `height x width` shape.
#[derive(Debug, Clone)]
pub struct Raster {
    bands: Vec<Array2<f64>>,
    bounds: Option<GeoBounds>,
}

impl Raster {
    pub fn new(bands: Vec<Array2<f64>>, bounds: Option<GeoBounds>) -> RasterResult<Self> {
        let first = bands
            .first()
            .ok_or_else(|| RasterError::UnsupportedLayout("raster has no bands".into()))?;
        let shape = first.dim();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(RasterError::UnsupportedLayout("raster is empty".into()));
        }
        if bands.iter().any(|band| band.dim() != shape) {
            return Err(RasterError::UnsupportedLayout(
                "bands differ in shape".into(),
            ));
        }
        Ok(Self { bands, bounds })
    }

    /// Decodes a GeoTIFF. The file handle lives only for the decode.
    pub fn open<P: AsRef<Path>>(path: P) -> RasterResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(Limits::unlimited());
        let (width, height) = decoder.dimensions()?;
        let bounds = read_bounds(&mut decoder, width, height)?;
        let samples = samples_as_f64(decoder.read_image()?);
        let bands = split_bands(&samples, width as usize, height as usize)?;
        Self::new(bands, bounds)
    }

    pub fn width(&self) -> usize {
        self.bands[0].ncols()
    }

    pub fn height(&self) -> usize {
        self.bands[0].nrows()
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band by 1-based index.
    pub fn band(&self, index: usize) -> Option<&Array2<f64>> {
        index.checked_sub(1).and_then(|i| self.bands.get(i))
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }
}

fn samples_as_f64(result: DecodingResult) -> Vec<f64> {
    match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}

/// De-interleaves chunky samples into one array per band.
fn split_bands(samples: &[f64], width: usize, height: usize) -> RasterResult<Vec<Array2<f64>>> {
    let pixels = width * height;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(RasterError::UnsupportedLayout(format!(
            "{} samples do not tile a {}x{} grid",
            samples.len(),
            width,
            height
        )));
    }
    let count = samples.len() / pixels;
    Ok((0..count)
        .map(|band| {
            Array2::from_shape_fn((height, width), |(row, col)| {
                samples[(row * width + col) * count + band]
            })
        })
        .collect())
}

fn tag_values<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> RasterResult<Option<Vec<f64>>> {
    let tag = Tag::from_u16_exhaustive(code);
    Ok(decoder
        .find_tag(tag)?
        .map(|value| value.into_f64_vec())
        .transpose()?)
}

/// Reads the extent from pixel scale + tiepoint, falling back to the affine
/// model transformation.
fn read_bounds<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> RasterResult<Option<GeoBounds>> {
    let (w, h) = (f64::from(width), f64::from(height));

    let scale = tag_values(decoder, MODEL_PIXEL_SCALE)?;
    let tiepoint = tag_values(decoder, MODEL_TIEPOINT)?;
    if let (Some(scale), Some(tie)) = (scale, tiepoint) {
        if scale.len() >= 2 && tie.len() >= 6 {
            let left = tie[3] - tie[0] * scale[0];
            let top = tie[4] + tie[1] * scale[1];
            return Ok(Some(GeoBounds {
                left,
                right: left + w * scale[0],
                bottom: top - h * scale[1],
                top,
            }));
        }
    }

    if let Some(m) = tag_values(decoder, MODEL_TRANSFORMATION)? {
        if m.len() >= 16 {
            let project = |i: f64, j: f64| (m[0] * i + m[1] * j + m[3], m[4] * i + m[5] * j + m[7]);
            let corners = [project(0.0, 0.0), project(w, 0.0), project(0.0, h), project(w, h)];
            return Ok(Some(GeoBounds::from_corners(&corners)));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::{colortype, TiffEncoder};

    #[test]
    fn raster_rejects_mismatched_bands() {
        let bands = vec![Array2::zeros((2, 2)), Array2::zeros((2, 3))];
        assert!(matches!(
            Raster::new(bands, None),
            Err(RasterError::UnsupportedLayout(_))
        ));
        assert!(Raster::new(Vec::new(), None).is_err());
    }

    #[test]
    fn band_lookup_is_one_based() {
        let raster = Raster::new(vec![Array2::zeros((2, 3)), Array2::ones((2, 3))], None).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert!(raster.band(0).is_none());
        assert_eq!(raster.band(2).unwrap()[[1, 2]], 1.0);
        assert!(raster.band(3).is_none());
    }

    #[test]
    fn split_bands_deinterleaves_pixels() {
        let samples = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0];
        let bands = split_bands(&samples, 2, 2).unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0][[1, 0]], 3.0);
        assert_eq!(bands[1][[0, 1]], 20.0);
        assert!(split_bands(&samples[..7], 2, 2).is_err());
    }

    #[test]
    fn open_reads_rgba_geotiff_with_bounds() {
        let temp = tempfile::Builder::new().suffix(".tif").tempfile().unwrap();
        {
            let mut encoder = TiffEncoder::new(temp.reopen().unwrap()).unwrap();
            let mut image = encoder.new_image::<colortype::RGBA8>(3, 2).unwrap();
            image
                .encoder()
                .write_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE), &[0.5f64, 0.25, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(
                    Tag::from_u16_exhaustive(MODEL_TIEPOINT),
                    &[0.0f64, 0.0, 0.0, 116.0, 40.0, 0.0][..],
                )
                .unwrap();
            let data: Vec<u8> = (0..24).collect();
            image.write_data(&data).unwrap();
        }

        let raster = Raster::open(temp.path()).unwrap();
        assert_eq!(raster.band_count(), 4);
        assert_eq!((raster.width(), raster.height()), (3, 2));
        assert_eq!(raster.band(1).unwrap()[[0, 1]], 4.0);
        assert_eq!(raster.band(4).unwrap()[[1, 2]], 23.0);

        let bounds = raster.bounds().unwrap();
        assert_eq!(bounds.left, 116.0);
        assert_eq!(bounds.right, 117.5);
        assert_eq!(bounds.top, 40.0);
        assert_eq!(bounds.bottom, 39.5);
    }

    #[test]
    fn open_without_georeferencing_has_no_bounds() {
        let temp = tempfile::Builder::new().suffix(".tif").tempfile().unwrap();
        {
            let mut encoder = TiffEncoder::new(temp.reopen().unwrap()).unwrap();
            encoder
                .write_image::<colortype::Gray8>(2, 2, &[0, 64, 128, 255])
                .unwrap();
        }
        let raster = Raster::open(temp.path()).unwrap();
        assert_eq!(raster.band_count(), 1);
        assert!(raster.bounds().is_none());
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let err = Raster::open("/nonexistent/basemap.tif").unwrap_err();
        assert!(matches!(err, RasterError::Io(_)));
    }

    #[test]
    fn bounds_from_rotated_corners_cover_every_corner() {
        let bounds = GeoBounds::from_corners(&[(1.0, 5.0), (3.0, 4.0), (0.0, 2.0), (2.0, 1.0)]);
        assert_eq!(bounds.left, 0.0);
        assert_eq!(bounds.right, 3.0);
        assert_eq!(bounds.bottom, 1.0);
        assert_eq!(bounds.top, 5.0);
        assert_eq!(bounds.width(), 3.0);
        assert_eq!(bounds.height(), 4.0);
    }
}
