//! Count histograms over color, chromaticity, and gradient magnitude.
//!
//! All functions return raw bucket counts. Multi-axis histograms are flattened
//! row-major, so a 3D color histogram stores bucket `(r, g, b)` at
//! `(r * bins + g) * bins + b`.

use crate::feature::region::Rect;
use crate::image::gradient::{luminance, sobel_magnitude};
use crate::image::PixelGrid;
use crate::util::{ImgMatchError, ImgMatchResult};

/// Largest supported per-axis bucket count.
pub const MAX_BINS: usize = 256;

pub(crate) fn check_bins(bins: usize) -> ImgMatchResult<()> {
    if bins == 0 || bins > MAX_BINS {
        return Err(ImgMatchError::InvalidInput("bins must be in 1..=256"));
    }
    Ok(())
}

/// Maps an 8-bit intensity to one of `bins` equal-width buckets over [0, 256).
#[inline]
fn intensity_bin(value: u8, bins: usize) -> usize {
    (usize::from(value) * bins / 256).min(bins - 1)
}

/// Joint R,G,B histogram over the whole image.
pub fn color_histogram_3d<G: PixelGrid + ?Sized>(
    grid: &G,
    bins: usize,
) -> ImgMatchResult<Vec<f32>> {
    color_histogram_3d_in(grid, bins, Rect::full(grid.width(), grid.height()))
}

/// Joint R,G,B histogram restricted to `rect`.
pub fn color_histogram_3d_in<G: PixelGrid + ?Sized>(
    grid: &G,
    bins: usize,
    rect: Rect,
) -> ImgMatchResult<Vec<f32>> {
    check_bins(bins)?;
    rect.check_within(grid.width(), grid.height())?;

    let mut hist = vec![0.0f32; bins * bins * bins];
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            let [b, g, r] = grid.bgr(x, y);
            let idx = (intensity_bin(r, bins) * bins + intensity_bin(g, bins)) * bins
                + intensity_bin(b, bins);
            hist[idx] += 1.0;
        }
    }
    Ok(hist)
}

/// Joint histogram of chromaticity `r = R / 255`, `g = G / 255` over [0, 1).
///
/// The value 255 maps to 1.0 and is clamped into the last bucket.
pub fn chromaticity_histogram<G: PixelGrid + ?Sized>(
    grid: &G,
    bins: usize,
) -> ImgMatchResult<Vec<f32>> {
    check_bins(bins)?;

    let bins_f = bins as f32;
    let chroma_bin = |value: u8| -> usize {
        let c = f32::from(value) / 255.0;
        ((c * bins_f) as usize).min(bins - 1)
    };

    let mut hist = vec![0.0f32; bins * bins];
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let [_, g, r] = grid.bgr(x, y);
            hist[chroma_bin(r) * bins + chroma_bin(g)] += 1.0;
        }
    }
    Ok(hist)
}

/// 1D histogram of the Sobel gradient magnitude over [0, 256).
pub fn texture_histogram<G: PixelGrid + ?Sized>(
    grid: &G,
    bins: usize,
) -> ImgMatchResult<Vec<f32>> {
    check_bins(bins)?;

    let gray = luminance(grid)?;
    let magnitude = sobel_magnitude(gray.view())?;
    let mut hist = vec![0.0f32; bins];
    for &value in magnitude.data() {
        hist[intensity_bin(value, bins)] += 1.0;
    }
    Ok(hist)
}

#[cfg(test)]
mod tests {
    use super::{chromaticity_histogram, color_histogram_3d_in, intensity_bin, texture_histogram};
    use crate::feature::region::Rect;
    use crate::image::OwnedImage;

    #[test]
    fn intensity_bin_clamps_top_value() {
        assert_eq!(intensity_bin(255, 8), 7);
        assert_eq!(intensity_bin(31, 8), 0);
        assert_eq!(intensity_bin(32, 8), 1);
        assert_eq!(intensity_bin(200, 1), 0);
    }

    #[test]
    fn region_histogram_counts_only_rect_pixels() {
        let img = OwnedImage::from_fn(4, 4, |_, y| if y < 2 { [0, 0, 255] } else { [255, 0, 0] })
            .unwrap();
        let hist = color_histogram_3d_in(&img, 2, Rect::new(0, 2, 4, 2)).unwrap();
        // Blue pixels: r bin 0, g bin 0, b bin 1.
        assert_eq!(hist[1], 8.0);
        assert_eq!(hist.iter().sum::<f32>(), 8.0);
    }

    #[test]
    fn chromaticity_white_lands_in_last_bucket() {
        let img = OwnedImage::filled(3, 3, [255u8, 255, 255]).unwrap();
        let hist = chromaticity_histogram(&img, 16).unwrap();
        assert_eq!(hist.len(), 256);
        assert_eq!(hist[15 * 16 + 15], 9.0);
    }

    #[test]
    fn flat_image_texture_is_all_in_first_bucket() {
        let img = OwnedImage::filled(5, 5, [40u8, 80, 120]).unwrap();
        let hist = texture_histogram(&img, 8).unwrap();
        assert_eq!(hist[0], 25.0);
        assert_eq!(hist.iter().sum::<f32>(), 25.0);
    }
}
