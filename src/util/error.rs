//! Error types for imgmatch.

use thiserror::Error;

/// Result alias for imgmatch operations.
pub type ImgMatchResult<T> = std::result::Result<T, ImgMatchError>;

/// Errors that can occur while extracting, storing, or ranking features.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ImgMatchError {
    /// A file could not be opened, read, or written.
    #[error("i/o error on {path}: {reason}")]
    Io { path: String, reason: String },
    /// An image could not be decoded.
    #[error("image i/o error: {reason}")]
    ImageIo { reason: String },
    /// A store row or numeric argument is malformed.
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
    /// The center patch does not fit inside the image.
    #[error("{size}x{size} patch does not fit a {img_width}x{img_height} image")]
    PatchOutOfBounds {
        size: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A histogram region lies outside the image or covers no pixels.
    #[error(
        "region ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image"
    )]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A histogram sums to zero or a vector has zero norm.
    #[error("degenerate vector: {reason}")]
    DegenerateVector { reason: &'static str },
    /// The requested image id has no record in the store.
    #[error("no feature record for image {image_id}")]
    NotFound { image_id: String },
    /// Two vectors (or a vector and a layout) disagree in length.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// Image dimensions are invalid.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The provided buffer is too small for the requested view.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// An image id appears twice in one store.
    #[error("duplicate image id {image_id}")]
    DuplicateId { image_id: String },
    /// An image id is empty, not UTF-8, or holds a comma or line break.
    #[error("invalid image id {image_id:?}")]
    InvalidImageId { image_id: String },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

impl ImgMatchError {
    /// Returns true when a batch may skip the offending item and continue.
    ///
    /// Parse errors, lookups of the requested target, and configuration
    /// errors are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ImgMatchError::Io { .. }
                | ImgMatchError::ImageIo { .. }
                | ImgMatchError::PatchOutOfBounds { .. }
                | ImgMatchError::RegionOutOfBounds { .. }
                | ImgMatchError::DegenerateVector { .. }
                | ImgMatchError::DimensionMismatch { .. }
                | ImgMatchError::InvalidImageId { .. }
        )
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        ImgMatchError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ImgMatchError;

    #[test]
    fn batch_errors_are_recoverable() {
        let err = ImgMatchError::DegenerateVector {
            reason: "histogram sums to zero",
        };
        assert!(err.is_recoverable());
        let err = ImgMatchError::ImageIo {
            reason: "corrupt".to_string(),
        };
        assert!(err.is_recoverable());
        let err = ImgMatchError::InvalidImageId {
            image_id: "a,b.png".to_string(),
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn query_errors_are_fatal() {
        let err = ImgMatchError::NotFound {
            image_id: "pic.0001.jpg".to_string(),
        };
        assert!(!err.is_recoverable());
        let err = ImgMatchError::Parse {
            line: 3,
            reason: "bad float".to_string(),
        };
        assert!(!err.is_recoverable());
    }
}
