//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoded pixels are
//! remapped from R,G,B to the B,G,R order the extractors expect.

use crate::image::{Bgr, OwnedImage};
use crate::util::{ImgMatchError, ImgMatchResult};
use std::path::Path;

/// Creates an owned B,G,R image from an RGB buffer.
pub fn bgr_from_rgb_image(img: &image::RgbImage) -> ImgMatchResult<OwnedImage<Bgr>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.pixels().map(|p| [p[2], p[1], p[0]]).collect();
    OwnedImage::new(data, width, height)
}

/// Creates an owned B,G,R image from a dynamic image.
pub fn bgr_from_dynamic_image(img: &image::DynamicImage) -> ImgMatchResult<OwnedImage<Bgr>> {
    bgr_from_rgb_image(&img.to_rgb8())
}

/// Loads an image from disk as B,G,R pixels.
pub fn load_bgr_image<P: AsRef<Path>>(path: P) -> ImgMatchResult<OwnedImage<Bgr>> {
    let img = image::open(path.as_ref()).map_err(|err| ImgMatchError::ImageIo {
        reason: format!("{}: {err}", path.as_ref().display()),
    })?;
    bgr_from_dynamic_image(&img)
}
