//! Raw center-patch feature.

use crate::image::PixelGrid;
use crate::util::{ImgMatchError, ImgMatchResult};

/// Side length of the square center patch.
pub const PATCH_SIZE: usize = 7;

/// Length of a center-patch vector: 49 pixels times 3 channels.
pub const PATCH_LEN: usize = PATCH_SIZE * PATCH_SIZE * 3;

/// Extracts the 7x7 block centered at `(width / 2, height / 2)`.
///
/// Pixels are emitted in row-major order, each as its B,G,R values, so the
/// result has [`PATCH_LEN`] elements. Even dimensions place the center one
/// pixel toward the lower-right.
pub fn center_patch<G: PixelGrid + ?Sized>(grid: &G) -> ImgMatchResult<Vec<f32>> {
    let width = grid.width();
    let height = grid.height();
    if width < PATCH_SIZE || height < PATCH_SIZE {
        return Err(ImgMatchError::PatchOutOfBounds {
            size: PATCH_SIZE,
            img_width: width,
            img_height: height,
        });
    }

    let half = PATCH_SIZE / 2;
    let cx = width / 2;
    let cy = height / 2;
    let mut out = Vec::with_capacity(PATCH_LEN);
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            out.extend(grid.bgr(x, y).iter().map(|&c| f32::from(c)));
        }
    }
    Ok(out)
}
