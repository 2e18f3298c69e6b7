//! Luminance conversion and 3x3 Sobel gradient magnitude.
//!
//! Luminance uses the BT.601 weights in 14-bit fixed point with rounding,
//! which reproduces the usual BGR-to-gray conversion bit for bit. Borders are
//! handled by reflect-101 (`gfedcb|abcdefgh|gfedcba`).

use crate::image::{ImageView, OwnedImage, PixelGrid};
use crate::util::math::saturate_round_u8;
use crate::util::ImgMatchResult;

const LUMA_SHIFT: u32 = 14;
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;

const SMOOTH: [i16; 3] = [1, 2, 1];

/// Converts a color grid to single-channel luminance.
pub fn luminance<G: PixelGrid + ?Sized>(grid: &G) -> ImgMatchResult<OwnedImage<u8>> {
    OwnedImage::from_fn(grid.width(), grid.height(), |x, y| {
        let [b, g, r] = grid.bgr(x, y);
        let acc = u32::from(b) * LUMA_B
            + u32::from(g) * LUMA_G
            + u32::from(r) * LUMA_R
            + (1 << (LUMA_SHIFT - 1));
        (acc >> LUMA_SHIFT) as u8
    })
}

/// Computes the gradient magnitude map `0.5 * |gx| + 0.5 * |gy|`.
///
/// Each signed 16-bit derivative is converted to `u8` by saturating its
/// absolute value before the blend; the blend rounds half to even.
pub fn sobel_magnitude(gray: ImageView<'_, u8>) -> ImgMatchResult<OwnedImage<u8>> {
    let width = gray.width();
    let height = gray.height();
    let at = |x: isize, y: isize| -> i16 {
        let xr = reflect101(x, width);
        let yr = reflect101(y, height);
        gray.get(xr, yr).copied().map(i16::from).unwrap_or(0)
    };

    OwnedImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as isize, y as isize);
        let mut gx = 0i16;
        let mut gy = 0i16;
        for (k, w) in SMOOTH.iter().enumerate() {
            let d = k as isize - 1;
            gx += w * (at(x + 1, y + d) - at(x - 1, y + d));
            gy += w * (at(x + d, y + 1) - at(x + d, y - 1));
        }
        let ax = gx.unsigned_abs().min(255) as f32;
        let ay = gy.unsigned_abs().min(255) as f32;
        saturate_round_u8(0.5 * ax + 0.5 * ay)
    })
}

fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}
