//! Structural similarity engine.
//!
//! Normalization is deterministic and documented: both inputs are resized
//! to the smaller of the two dimensions along each axis with Lanczos3
//! interpolation, then converted to Rec.601 luma. SSIM is computed over
//! uniform 7x7 windows (K1=0.01, K2=0.03, dynamic range 255) using
//! integral images, and the mean over all window positions is clamped to
//! [0, 1]. Identical inputs score exactly 1.0; the metric is symmetric.
//!
//! No threshold is applied here; the verdict policy lives in the detector.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use veriframe_core::{Error, Result};

/// Minimum width/height for a reliable comparison.
pub const MIN_DIMENSION: u32 = 32;

/// Side length of the SSIM sliding window.
const WINDOW: usize = 7;

/// Stabilization constants for luminance and contrast terms, derived from
/// K1=0.01, K2=0.03 over a dynamic range of 255.
const C1: f64 = 6.5025;
const C2: f64 = 58.5225;

/// Compare two decoded images, producing a similarity score in [0, 1].
///
/// # Errors
///
/// Returns [`Error::Comparison`] when either input (or the common shape
/// after normalization) is smaller than [`MIN_DIMENSION`] on either axis.
pub fn compare(a: &DynamicImage, b: &DynamicImage) -> Result<f64> {
    let (ga, gb) = normalize_pair(a, b)?;
    let score = ssim(&ga, &gb).clamp(0.0, 1.0);
    tracing::debug!(
        score,
        width = ga.width(),
        height = ga.height(),
        "computed structural similarity"
    );
    Ok(score)
}

/// Resize both images to their common minimum shape and convert to luma.
fn normalize_pair(a: &DynamicImage, b: &DynamicImage) -> Result<(GrayImage, GrayImage)> {
    check_min_size("first", a.width(), a.height())?;
    check_min_size("second", b.width(), b.height())?;

    let target_w = a.width().min(b.width());
    let target_h = a.height().min(b.height());
    check_min_size("normalized", target_w, target_h)?;

    let ga = resize_to(a, target_w, target_h).to_luma8();
    let gb = resize_to(b, target_w, target_h).to_luma8();
    Ok((ga, gb))
}

fn check_min_size(which: &str, width: u32, height: u32) -> Result<()> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(Error::Comparison(format!(
            "{which} image too small: {width}x{height}, minimum: {MIN_DIMENSION}x{MIN_DIMENSION}"
        )));
    }
    Ok(())
}

fn resize_to(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        img.clone()
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// Mean SSIM over all window positions of two equal-shaped luma images.
fn ssim(x: &GrayImage, y: &GrayImage) -> f64 {
    debug_assert_eq!(x.dimensions(), y.dimensions());
    let w = x.width() as usize;
    let h = x.height() as usize;
    debug_assert!(w >= WINDOW && h >= WINDOW);

    let xs: Vec<f64> = x.as_raw().iter().map(|&p| f64::from(p)).collect();
    let ys: Vec<f64> = y.as_raw().iter().map(|&p| f64::from(p)).collect();

    let sum_x = Integral::build(w, h, |i| xs[i]);
    let sum_y = Integral::build(w, h, |i| ys[i]);
    let sum_xx = Integral::build(w, h, |i| xs[i] * xs[i]);
    let sum_yy = Integral::build(w, h, |i| ys[i] * ys[i]);
    let sum_xy = Integral::build(w, h, |i| xs[i] * ys[i]);

    let n = (WINDOW * WINDOW) as f64;
    let mut total = 0.0;
    let mut count = 0u64;

    for y0 in 0..=(h - WINDOW) {
        for x0 in 0..=(w - WINDOW) {
            let mx = sum_x.window(x0, y0) / n;
            let my = sum_y.window(x0, y0) / n;
            let vx = sum_xx.window(x0, y0) / n - mx * mx;
            let vy = sum_yy.window(x0, y0) / n - my * my;
            let cov = sum_xy.window(x0, y0) / n - mx * my;

            let numerator = (2.0 * mx * my + C1) * (2.0 * cov + C2);
            let denominator = (mx * mx + my * my + C1) * (vx + vy + C2);
            total += numerator / denominator;
            count += 1;
        }
    }

    total / count as f64
}

/// Summed-area table with one row/column of zero padding, so any window
/// sum is four lookups.
struct Integral {
    table: Vec<f64>,
    stride: usize,
}

impl Integral {
    fn build(w: usize, h: usize, value_at: impl Fn(usize) -> f64) -> Self {
        let stride = w + 1;
        let mut table = vec![0.0; stride * (h + 1)];
        for row in 0..h {
            let mut row_sum = 0.0;
            for col in 0..w {
                row_sum += value_at(row * w + col);
                table[(row + 1) * stride + col + 1] = table[row * stride + col + 1] + row_sum;
            }
        }
        Self { table, stride }
    }

    /// Sum of the WINDOW x WINDOW block whose top-left corner is (x0, y0).
    fn window(&self, x0: usize, y0: usize) -> f64 {
        let (x1, y1) = (x0 + WINDOW, y0 + WINDOW);
        self.table[y1 * self.stride + x1] + self.table[y0 * self.stride + x0]
            - self.table[y0 * self.stride + x1]
            - self.table[y1 * self.stride + x0]
    }
}
