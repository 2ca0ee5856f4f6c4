//! Diagnostic outputs: difference maps and image property statistics.
//!
//! Neither affects the verdict; both exist for operators inspecting a
//! flagged comparison.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use serde::Serialize;
use veriframe_core::{Error, Result};

/// Amplification factor applied to the per-channel difference so subtle
/// edits remain visible.
const DIFF_GAIN: u16 = 3;

/// Render a difference map of two images: per-channel absolute difference
/// over the common shape, amplified and saturated.
pub fn difference_image(a: &DynamicImage, b: &DynamicImage) -> Result<RgbImage> {
    let target_w = a.width().min(b.width());
    let target_h = a.height().min(b.height());
    if target_w == 0 || target_h == 0 {
        return Err(Error::Comparison("image has zero area".into()));
    }

    let ra = resize_rgb(a, target_w, target_h);
    let rb = resize_rgb(b, target_w, target_h);

    let mut out = RgbImage::new(target_w, target_h);
    for (dst, (pa, pb)) in out.pixels_mut().zip(ra.pixels().zip(rb.pixels())) {
        for c in 0..3 {
            let delta = u16::from(pa.0[c].abs_diff(pb.0[c]));
            dst.0[c] = (delta * DIFF_GAIN).min(255) as u8;
        }
    }
    Ok(out)
}

fn resize_rgb(img: &DynamicImage, width: u32, height: u32) -> RgbImage {
    if img.width() == width && img.height() == height {
        img.to_rgb8()
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
    }
}

/// Basic properties of a decoded image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageProperties {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub mean_intensity: f64,
    pub std_intensity: f64,
    pub min_intensity: u8,
    pub max_intensity: u8,
}

/// Compute dimensions and intensity statistics over the RGB samples.
pub fn analyze_properties(img: &DynamicImage) -> Result<ImageProperties> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(Error::Comparison("image has zero area".into()));
    }

    let rgb = img.to_rgb8();
    let samples = rgb.as_raw();

    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum = 0.0f64;
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
        sum += f64::from(s);
    }
    let n = samples.len() as f64;
    let mean = sum / n;
    let variance = samples
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    Ok(ImageProperties {
        width,
        height,
        channels: 3,
        mean_intensity: mean,
        std_intensity: variance.sqrt(),
        min_intensity: min,
        max_intensity: max,
    })
}
