//! Pixel grids, image views, and the gradient helpers used by texture features.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. Color pixels are stored
//! as `[u8; 3]` in B,G,R order, matching the native decode convention that the
//! histogram bucket assignments are defined against.

use crate::util::{ImgMatchError, ImgMatchResult};

pub mod gradient;
#[cfg(feature = "image-io")]
pub mod io;

/// One color pixel in B,G,R channel order.
pub type Bgr = [u8; 3];

/// Decoded image with 3-channel pixel access.
///
/// This is the seam to the external decoder: extractors only need the
/// dimensions and per-pixel B,G,R intensities.
pub trait PixelGrid {
    /// Returns the image width in pixels.
    fn width(&self) -> usize;

    /// Returns the image height in pixels.
    fn height(&self) -> usize;

    /// Returns the pixel at `(x, y)` in B,G,R order.
    ///
    /// Callers must keep `x < width()` and `y < height()`.
    fn bgr(&self, x: usize, y: usize) -> Bgr;
}

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// View over an unpadded row-major buffer.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> ImgMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// View over a buffer whose rows are `stride` elements apart.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> ImgMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(ImgMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Elements between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Element at `(x, y)`, or `None` outside the view.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        self.row(y)?.get(x)
    }

    /// Row `y` without its padding.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        // `new` checked that the last row fits, so this cannot overflow.
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }
}

impl PixelGrid for ImageView<'_, Bgr> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn bgr(&self, x: usize, y: usize) -> Bgr {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.stride + x]
    }
}

/// Owned contiguous image buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy> OwnedImage<T> {
    /// Wraps a row-major buffer of exactly `width * height` elements.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> ImgMatchResult<Self> {
        let needed = required_len(width, height, width)?;
        if data.len() < needed {
            return Err(ImgMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(ImgMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> ImgMatchResult<Self> {
        let needed = required_len(width, height, width)?;
        let mut data = Vec::with_capacity(needed);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Builds an image where every pixel equals `value`.
    pub fn filled(width: usize, height: usize, value: T) -> ImgMatchResult<Self> {
        Self::from_fn(width, height, |_, _| value)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixels, `width * height` of them.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Borrows the buffer as an unpadded view.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

impl PixelGrid for OwnedImage<Bgr> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn bgr(&self, x: usize, y: usize) -> Bgr {
        self.view().bgr(x, y)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> ImgMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(ImgMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(ImgMatchError::InvalidInput("stride must be at least the width"));
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(ImgMatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}
