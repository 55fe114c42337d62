use crate::prelude::SceneConfig;
use image::RgbImage;

/// In-place adjustment applied to the composited background.
pub trait Enhancement {
    fn name(&self) -> &'static str;
    fn apply(&self, image: &mut RgbImage);
}

/// Scales each channel's distance from the image's mean luma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contrast(pub f32);

/// Scales each channel's distance from black.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brightness(pub f32);

impl Enhancement for Contrast {
    fn name(&self) -> &'static str {
        "contrast"
    }

    fn apply(&self, image: &mut RgbImage) {
        let mean = mean_luma(image);
        for pixel in image.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = blend(mean, *channel, self.0);
            }
        }
    }
}

impl Enhancement for Brightness {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn apply(&self, image: &mut RgbImage) {
        for pixel in image.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = blend(0.0, *channel, self.0);
            }
        }
    }
}

/// Enhancement chain for a render: contrast then brightness, or nothing.
pub fn enhancements_for(config: &SceneConfig) -> Vec<Box<dyn Enhancement>> {
    if !config.enhance {
        return Vec::new();
    }
    vec![
        Box::new(Contrast(config.contrast)),
        Box::new(Brightness(config.brightness)),
    ]
}

fn blend(base: f32, value: u8, factor: f32) -> u8 {
    (base + factor * (f32::from(value) - base)).clamp(0.0, 255.0) as u8
}

/// Rounded mean of the ITU-R 601 luma over all pixels.
fn mean_luma(image: &RgbImage) -> f32 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0.0;
    }
    let total: u64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (u64::from(r) * 19595 + u64::from(g) * 38470 + u64::from(b) * 7471 + 0x8000) >> 16
        })
        .sum();
    (total as f64 / count as f64 + 0.5).floor() as f32
}
