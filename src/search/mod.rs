//! Exhaustive top-K search over a feature store.
//!
//! The matcher scores the target against every record, then sorts once all
//! scores are in. With the `rayon` feature and `parallel` enabled the per-record
//! scoring runs on the rayon pool; the sort and selection stay sequential.

#[cfg(feature = "rayon")]
mod par;
mod scan;

use crate::feature::Features;
use crate::metric::WeightedMetric;
use crate::rank::{select_extremes, RankedMatch, Ranking};
use crate::store::FeatureStore;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::ImgMatchResult;

/// Configuration for a ranking pass.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Number of best matches to report.
    pub k: usize,
    /// Number of least similar matches to report (diagnostic).
    pub least: usize,
    /// Score records in parallel when the `rayon` feature is enabled.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            k: 3,
            least: 0,
            parallel: false,
        }
    }
}

/// Ranks stored records against a target with a fixed metric.
#[derive(Clone, Debug)]
pub struct Matcher {
    metric: WeightedMetric,
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher with the default configuration.
    pub fn new(metric: WeightedMetric) -> Self {
        Self {
            metric,
            cfg: MatchConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the metric.
    pub fn metric(&self) -> &WeightedMetric {
        &self.metric
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Scores every record and returns the best `k` and worst `least` matches.
    ///
    /// The target is validated first: a layout that does not fit the metric or
    /// a degenerate target vector fails the query. Records that cannot be
    /// scored (wrong length, zero-norm vector) are skipped and counted.
    pub fn rank(&self, target: &Features, store: &FeatureStore) -> ImgMatchResult<Ranking> {
        let _span = trace_span!("rank", records = store.len(), k = self.cfg.k).entered();
        self.metric.score(target, target)?;

        let scored = if self.cfg.parallel {
            self.score_records_par(target, store)
        } else {
            scan::score_records(&self.metric, target, store.records())
        };

        let mut matches = Vec::with_capacity(scored.len());
        let mut skipped = 0usize;
        for (image_id, result) in scored {
            match result {
                Ok(score) => matches.push(RankedMatch::new(score, image_id)),
                Err(err) if err.is_recoverable() => {
                    trace_warn!("record_skipped", image_id = image_id, error = err);
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        let mut ranking =
            select_extremes(matches, self.metric.direction(), self.cfg.k, self.cfg.least);
        ranking.skipped = skipped;
        trace_event!(
            "rank_done",
            best = ranking.best.len(),
            skipped = ranking.skipped
        );
        Ok(ranking)
    }

    #[cfg(feature = "rayon")]
    fn score_records_par<'s>(
        &self,
        target: &Features,
        store: &'s FeatureStore,
    ) -> Vec<(&'s str, ImgMatchResult<f32>)> {
        par::score_records_par(&self.metric, target, store.records())
    }

    #[cfg(not(feature = "rayon"))]
    fn score_records_par<'s>(
        &self,
        target: &Features,
        store: &'s FeatureStore,
    ) -> Vec<(&'s str, ImgMatchResult<f32>)> {
        scan::score_records(&self.metric, target, store.records())
    }
}
