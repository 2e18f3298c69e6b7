//! Rayon-parallel per-record scoring (feature-gated).
//!
//! Results are collected in store order so the later sort sees the same input
//! as the sequential path.

use crate::feature::Features;
use crate::metric::WeightedMetric;
use crate::search::scan::score_record;
use crate::store::FeatureRecord;
use crate::util::ImgMatchResult;
use rayon::prelude::*;

/// Scores every record on the rayon pool.
pub(crate) fn score_records_par<'s>(
    metric: &WeightedMetric,
    target: &Features,
    records: &'s [FeatureRecord],
) -> Vec<(&'s str, ImgMatchResult<f32>)> {
    records
        .par_iter()
        .map(|record| {
            (
                record.image_id.as_str(),
                score_record(metric, target, record),
            )
        })
        .collect()
}
