//! imgmatch is a content-based image retrieval engine.
//!
//! Images are reduced to feature vectors by a pluggable [`Strategy`] (center
//! patch, color, chromaticity, texture, or region histograms, or a precomputed
//! embedding), persisted in a plain-text [`FeatureStore`], and ranked against a
//! target by a [`Matcher`] using a [`WeightedMetric`]. Search is an exhaustive
//! linear scan with deterministic tie-breaking. Parallel extraction and
//! scoring are available via the `rayon` feature; image decoding via
//! `image-io`; structured logs via `tracing`.

pub mod feature;
pub mod image;
pub mod index;
pub mod method;
pub mod metric;
pub mod rank;
pub mod search;
pub mod store;
mod trace;
pub mod util;

pub use feature::{Features, Rect, RegionLayout, Strategy};
pub use image::{Bgr, ImageView, OwnedImage, PixelGrid};
pub use index::{
    attach_embedding, image_id_from_path, index_images, lookup_target, rank_targets,
    IndexConfig, IndexReport,
};
pub use method::Method;
pub use metric::{Direction, Metric, WeightedMetric, WeightedTerm};
pub use rank::{RankedMatch, Ranking};
pub use search::{MatchConfig, Matcher};
pub use store::{FeatureRecord, FeatureStore};
pub use util::{ImgMatchError, ImgMatchResult};

#[cfg(feature = "image-io")]
pub use image::io;
#[cfg(feature = "image-io")]
pub use index::index_directory;
