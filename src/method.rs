//! Named retrieval methods: an extraction strategy paired with its default metric.

use crate::feature::{RegionLayout, Strategy};
use crate::metric::{Metric, WeightedMetric, WeightedTerm};
use crate::util::{ImgMatchError, ImgMatchResult};
use std::fmt;
use std::str::FromStr;

/// Default per-axis bucket count for histogram methods.
pub const DEFAULT_BINS: usize = 8;

/// Default bucket count for the chromaticity method.
pub const DEFAULT_CHROMATICITY_BINS: usize = 16;

/// A retrieval method selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Center patch scored by SSD.
    Baseline,
    /// 3D color histogram scored by `1 - intersection`.
    Histogram,
    /// Gradient magnitude histogram scored by `1 - intersection`.
    Texture,
    /// r,g chromaticity histogram scored by `1 - intersection`.
    Chromaticity,
    /// Per-region color histograms, intersections averaged.
    Multi,
    /// Color and texture histograms, intersections averaged.
    ColorTexture,
    /// Precomputed embeddings scored by cosine distance.
    Deep,
    /// Color and texture histograms plus a precomputed embedding,
    /// `0.4 * color + 0.3 * texture + 0.3 * deep` distance.
    Custom,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Baseline,
        Method::Histogram,
        Method::Texture,
        Method::Chromaticity,
        Method::Multi,
        Method::ColorTexture,
        Method::Deep,
        Method::Custom,
    ];

    /// Returns the command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Method::Baseline => "baseline",
            Method::Histogram => "histogram",
            Method::Texture => "texture",
            Method::Chromaticity => "chromaticity",
            Method::Multi => "multi",
            Method::ColorTexture => "color-texture",
            Method::Deep => "deep",
            Method::Custom => "custom",
        }
    }

    /// Returns the bucket count used when none is configured.
    pub fn default_bins(self) -> usize {
        match self {
            Method::Chromaticity => DEFAULT_CHROMATICITY_BINS,
            _ => DEFAULT_BINS,
        }
    }

    /// Builds the extraction strategy.
    ///
    /// `Custom` extracts the same color and texture segments as
    /// `ColorTexture`; its embedding segment is attached from a second store.
    pub fn strategy(self, bins: Option<usize>, regions: &RegionLayout) -> Strategy {
        let bins = bins.unwrap_or_else(|| self.default_bins());
        match self {
            Method::Baseline => Strategy::CenterPatch,
            Method::Histogram => Strategy::ColorHistogram { bins },
            Method::Texture => Strategy::Texture { bins },
            Method::Chromaticity => Strategy::Chromaticity { bins },
            Method::Multi => Strategy::Region {
                bins,
                layout: regions.clone(),
            },
            Method::ColorTexture | Method::Custom => Strategy::ColorTexture { bins },
            Method::Deep => Strategy::DeepEmbedding,
        }
    }

    /// Builds the metric used when no weights are configured.
    pub fn default_metric(self, regions: &RegionLayout) -> ImgMatchResult<WeightedMetric> {
        match self {
            Method::Baseline => Ok(WeightedMetric::single(Metric::Ssd)),
            Method::Histogram | Method::Texture | Method::Chromaticity => {
                Ok(WeightedMetric::single(Metric::IntersectionDistance))
            }
            Method::Multi => WeightedMetric::uniform(Metric::Intersection, regions.len()),
            Method::ColorTexture => WeightedMetric::uniform(Metric::Intersection, 2),
            Method::Deep => Ok(WeightedMetric::single(Metric::Cosine)),
            Method::Custom => WeightedMetric::new(vec![
                WeightedTerm::new(Metric::IntersectionDistance, 0.4),
                WeightedTerm::new(Metric::IntersectionDistance, 0.3),
                WeightedTerm::new(Metric::Cosine, 0.3),
            ]),
        }
    }

    /// Returns true when records need an embedding joined in at match time.
    pub fn uses_embeddings(self) -> bool {
        matches!(self, Method::Custom)
    }

    /// Returns true when the target's vector is read from the store instead
    /// of being extracted from the target image.
    pub fn target_from_store(self) -> bool {
        matches!(self, Method::Deep)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = ImgMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "histo" => return Ok(Method::Chromaticity),
            "colortexture" | "color_texture" => return Ok(Method::ColorTexture),
            _ => {}
        }
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or(ImgMatchError::InvalidInput("unknown strategy name"))
    }
}
