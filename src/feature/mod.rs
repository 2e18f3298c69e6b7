//! Feature extraction strategies.
//!
//! A [`Strategy`] turns a [`PixelGrid`] into [`Features`]: one flat vector
//! split into named segments. Single-histogram strategies yield one segment;
//! region and combined strategies yield one segment per sub-histogram so each
//! can be normalized and scored on its own. `extract` returns raw counts and
//! `describe` applies per-segment normalization for histogram strategies.

pub mod histogram;
pub mod normalize;
pub mod patch;
pub mod region;

pub use histogram::{
    chromaticity_histogram, color_histogram_3d, color_histogram_3d_in, texture_histogram,
};
pub use normalize::normalize;
pub use patch::{center_patch, PATCH_LEN, PATCH_SIZE};
pub use region::{Rect, RegionLayout};

use crate::image::PixelGrid;
use crate::trace::trace_span;
use crate::util::{ImgMatchError, ImgMatchResult};

/// Feature vector split into contiguous segments.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    values: Vec<f32>,
    lengths: Vec<usize>,
}

impl Features {
    /// Wraps a single-segment vector.
    pub fn single(values: Vec<f32>) -> Self {
        let lengths = vec![values.len()];
        Self { values, lengths }
    }

    /// Concatenates segments in order.
    pub fn from_segments(segments: Vec<Vec<f32>>) -> Self {
        let lengths = segments.iter().map(Vec::len).collect();
        let values = segments.into_iter().flatten().collect();
        Self { values, lengths }
    }

    /// Splits a flat vector using the given segment lengths.
    pub fn split(values: Vec<f32>, lengths: &[usize]) -> ImgMatchResult<Self> {
        let expected: usize = lengths.iter().sum();
        if expected != values.len() {
            return Err(ImgMatchError::DimensionMismatch {
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            values,
            lengths: lengths.to_vec(),
        })
    }

    /// Returns the flat vector across all segments.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consumes the features and returns the flat vector.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Returns the length of every segment.
    pub fn segment_lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Returns the number of segments.
    pub fn num_segments(&self) -> usize {
        self.lengths.len()
    }

    /// Returns segment `index` if it exists.
    pub fn segment(&self, index: usize) -> Option<&[f32]> {
        let len = *self.lengths.get(index)?;
        let start: usize = self.lengths[..index].iter().sum();
        self.values.get(start..start + len)
    }

    /// Iterates over segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let mut start = 0;
        self.lengths.iter().map(move |&len| {
            let seg = &self.values[start..start + len];
            start += len;
            seg
        })
    }

    /// Appends one more segment.
    pub fn with_segment(mut self, segment: &[f32]) -> Self {
        self.values.extend_from_slice(segment);
        self.lengths.push(segment.len());
        self
    }

    /// Normalizes every segment independently to unit sum.
    pub fn normalized(&self) -> ImgMatchResult<Self> {
        let segments = self
            .segments()
            .map(normalize)
            .collect::<ImgMatchResult<Vec<_>>>()?;
        Ok(Self::from_segments(segments))
    }
}

/// Feature extraction strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    /// Raw B,G,R values of the 7x7 center block (147 values).
    CenterPatch,
    /// Joint 3D color histogram with `bins` buckets per channel.
    ColorHistogram { bins: usize },
    /// 1D histogram of Sobel gradient magnitude.
    Texture { bins: usize },
    /// Joint 2D histogram of r,g chromaticity.
    Chromaticity { bins: usize },
    /// One 3D color histogram per region, concatenated in region order.
    Region { bins: usize, layout: RegionLayout },
    /// Color histogram segment followed by a texture histogram segment.
    ColorTexture { bins: usize },
    /// Precomputed embedding read from a store; never extracted from pixels.
    DeepEmbedding,
}

impl Strategy {
    /// Returns a short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CenterPatch => "center_patch",
            Strategy::ColorHistogram { .. } => "color_histogram",
            Strategy::Texture { .. } => "texture",
            Strategy::Chromaticity { .. } => "chromaticity",
            Strategy::Region { .. } => "region",
            Strategy::ColorTexture { .. } => "color_texture",
            Strategy::DeepEmbedding => "deep_embedding",
        }
    }

    /// Returns true when the strategy emits count histograms.
    pub fn is_histogram(&self) -> bool {
        !matches!(self, Strategy::CenterPatch | Strategy::DeepEmbedding)
    }

    /// Extracts raw (unnormalized) features from a pixel grid.
    pub fn extract<G: PixelGrid + ?Sized>(&self, grid: &G) -> ImgMatchResult<Features> {
        let _span = trace_span!("extract", strategy = self.name()).entered();
        match self {
            Strategy::CenterPatch => Ok(Features::single(center_patch(grid)?)),
            Strategy::ColorHistogram { bins } => {
                Ok(Features::single(color_histogram_3d(grid, *bins)?))
            }
            Strategy::Texture { bins } => Ok(Features::single(texture_histogram(grid, *bins)?)),
            Strategy::Chromaticity { bins } => {
                Ok(Features::single(chromaticity_histogram(grid, *bins)?))
            }
            Strategy::Region { bins, layout } => {
                let rects = layout.resolve(grid.width(), grid.height())?;
                let segments = rects
                    .into_iter()
                    .map(|rect| color_histogram_3d_in(grid, *bins, rect))
                    .collect::<ImgMatchResult<Vec<_>>>()?;
                Ok(Features::from_segments(segments))
            }
            Strategy::ColorTexture { bins } => Ok(Features::from_segments(vec![
                color_histogram_3d(grid, *bins)?,
                texture_histogram(grid, *bins)?,
            ])),
            Strategy::DeepEmbedding => Err(ImgMatchError::InvalidInput(
                "deep embeddings are looked up in a store, not extracted",
            )),
        }
    }

    /// Extracts features and normalizes histogram segments to unit sum.
    pub fn describe<G: PixelGrid + ?Sized>(&self, grid: &G) -> ImgMatchResult<Features> {
        let raw = self.extract(grid)?;
        if self.is_histogram() {
            raw.normalized()
        } else {
            Ok(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Features, Strategy};
    use crate::image::OwnedImage;
    use crate::ImgMatchError;

    #[test]
    fn segments_round_trip_through_split() {
        let features = Features::from_segments(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(features.segment(1), Some(&[3.0f32][..]));
        let values = features.clone().into_values();
        let split = Features::split(values, &[2, 1]).unwrap();
        assert_eq!(split, features);
        assert_eq!(split.segments().count(), 2);
    }

    #[test]
    fn split_rejects_wrong_total_length() {
        let err = Features::split(vec![0.0; 5], &[2, 2]).unwrap_err();
        assert_eq!(err, ImgMatchError::DimensionMismatch { expected: 4, got: 5 });
    }

    #[test]
    fn color_texture_segments_normalize_independently() {
        let img = OwnedImage::from_fn(6, 6, |x, _| [0, 0, (x * 40) as u8]).unwrap();
        let features = Strategy::ColorTexture { bins: 4 }.describe(&img).unwrap();
        assert_eq!(features.segment_lengths(), &[64, 4]);
        for seg in features.segments() {
            let sum: f32 = seg.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn deep_embedding_is_not_extractable() {
        let img = OwnedImage::filled(8, 8, [0u8; 3]).unwrap();
        assert!(matches!(
            Strategy::DeepEmbedding.extract(&img),
            Err(ImgMatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn center_patch_is_not_normalized() {
        let img = OwnedImage::filled(7, 7, [10u8, 20, 30]).unwrap();
        let features = Strategy::CenterPatch.describe(&img).unwrap();
        assert_eq!(&features.values()[..3], &[10.0, 20.0, 30.0]);
    }
}
