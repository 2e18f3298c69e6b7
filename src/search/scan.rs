//! Sequential per-record scoring.

use crate::feature::Features;
use crate::metric::WeightedMetric;
use crate::store::FeatureRecord;
use crate::util::ImgMatchResult;

/// Scores the target against one stored flat vector.
#[inline]
pub(crate) fn score_record(
    metric: &WeightedMetric,
    target: &Features,
    record: &FeatureRecord,
) -> ImgMatchResult<f32> {
    metric.score_flat(target, &record.vector)
}

/// Scores every record in store order.
pub(crate) fn score_records<'s>(
    metric: &WeightedMetric,
    target: &Features,
    records: &'s [FeatureRecord],
) -> Vec<(&'s str, ImgMatchResult<f32>)> {
    records
        .iter()
        .map(|record| {
            (
                record.image_id.as_str(),
                score_record(metric, target, record),
            )
        })
        .collect()
}
