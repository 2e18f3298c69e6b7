//! Weighted combination of per-segment metrics.

use crate::feature::Features;
use crate::metric::{Direction, Metric};
use crate::util::{ImgMatchError, ImgMatchResult};

/// One `(metric, weight)` pair applied to the matching feature segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedTerm {
    pub metric: Metric,
    pub weight: f32,
}

impl WeightedTerm {
    pub fn new(metric: Metric, weight: f32) -> Self {
        Self { metric, weight }
    }
}

/// Ordered list of weighted terms; term `i` scores segment `i`.
///
/// All terms share one [`Direction`], which becomes the direction of the
/// combined score.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedMetric {
    terms: Vec<WeightedTerm>,
    direction: Direction,
}

impl WeightedMetric {
    /// Validates and builds a combination.
    pub fn new(terms: Vec<WeightedTerm>) -> ImgMatchResult<Self> {
        let first = terms
            .first()
            .ok_or(ImgMatchError::InvalidInput("metric needs at least one term"))?;
        let direction = first.metric.direction();
        if terms.iter().any(|t| t.metric.direction() != direction) {
            return Err(ImgMatchError::InvalidInput(
                "metric terms must share one ranking direction",
            ));
        }
        if terms.iter().any(|t| !t.weight.is_finite() || t.weight < 0.0) {
            return Err(ImgMatchError::InvalidInput(
                "metric weights must be finite and non-negative",
            ));
        }
        Ok(Self { terms, direction })
    }

    /// Single metric with weight 1.
    pub fn single(metric: Metric) -> Self {
        Self {
            terms: vec![WeightedTerm::new(metric, 1.0)],
            direction: metric.direction(),
        }
    }

    /// The same metric on `count` segments with equal weights `1 / count`.
    pub fn uniform(metric: Metric, count: usize) -> ImgMatchResult<Self> {
        if count == 0 {
            return Err(ImgMatchError::InvalidInput("metric needs at least one term"));
        }
        let weight = 1.0 / count as f32;
        Self::new(vec![WeightedTerm::new(metric, weight); count])
    }

    /// Returns the terms in segment order.
    pub fn terms(&self) -> &[WeightedTerm] {
        &self.terms
    }

    /// Returns the ranking direction of the combined score.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Combines per-term scores as a weighted sum.
    pub fn combine(&self, scores: &[f32]) -> ImgMatchResult<f32> {
        if scores.len() != self.terms.len() {
            return Err(ImgMatchError::DimensionMismatch {
                expected: self.terms.len(),
                got: scores.len(),
            });
        }
        let total: f64 = self
            .terms
            .iter()
            .zip(scores)
            .map(|(term, &s)| f64::from(term.weight) * f64::from(s))
            .sum();
        Ok(total as f32)
    }

    /// Scores two segmented feature sets with identical layouts.
    pub fn score(&self, a: &Features, b: &Features) -> ImgMatchResult<f32> {
        if a.segment_lengths() != b.segment_lengths() {
            return Err(ImgMatchError::InvalidInput("feature segment layouts differ"));
        }
        self.score_flat(a, b.values())
    }

    /// Scores `a` against a flat vector laid out with `a`'s segment lengths.
    pub fn score_flat(&self, a: &Features, b: &[f32]) -> ImgMatchResult<f32> {
        if a.num_segments() != self.terms.len() {
            return Err(ImgMatchError::DimensionMismatch {
                expected: self.terms.len(),
                got: a.num_segments(),
            });
        }
        if b.len() != a.values().len() {
            return Err(ImgMatchError::DimensionMismatch {
                expected: a.values().len(),
                got: b.len(),
            });
        }
        let mut start = 0;
        let scores = self
            .terms
            .iter()
            .zip(a.segments())
            .map(|(term, sa)| {
                let sb = &b[start..start + sa.len()];
                start += sa.len();
                term.metric.score(sa, sb)
            })
            .collect::<ImgMatchResult<Vec<_>>>()?;
        self.combine(&scores)
    }
}
