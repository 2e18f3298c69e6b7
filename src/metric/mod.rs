//! Distance and similarity metrics over feature vectors.
//!
//! Each metric documents its [`Direction`]: distance-style metrics rank
//! ascending (lower is more similar), similarity-style metrics rank descending.
//! [`WeightedMetric`] combines per-segment metrics into one score.

mod weighted;

pub use weighted::{WeightedMetric, WeightedTerm};

use crate::util::math::{dot_f64, l2_norm_f64};
use crate::util::{ImgMatchError, ImgMatchResult};
use std::fmt;
use std::str::FromStr;

/// Ranking direction of a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Lower scores are better (distances).
    Ascending,
    /// Higher scores are better (similarities).
    Descending,
}

/// Scoring strategy between two equal-length vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Sum of squared differences. Ascending.
    Ssd,
    /// Histogram intersection `sum(min(a, b))`. Descending; in [0, 1] for
    /// normalized histograms.
    Intersection,
    /// `1 - intersection`. Ascending.
    IntersectionDistance,
    /// Cosine distance `1 - a.b / (|a| |b|)`. Ascending.
    Cosine,
}

impl Metric {
    /// Returns the ranking direction of this metric's scores.
    pub fn direction(self) -> Direction {
        match self {
            Metric::Intersection => Direction::Descending,
            Metric::Ssd | Metric::IntersectionDistance | Metric::Cosine => Direction::Ascending,
        }
    }

    /// Returns the configuration name of the metric.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Ssd => "ssd",
            Metric::Intersection => "intersection",
            Metric::IntersectionDistance => "intersection_distance",
            Metric::Cosine => "cosine",
        }
    }

    /// Scores `a` against `b`.
    ///
    /// Fails on length mismatch, and for [`Metric::Cosine`] when either vector
    /// has zero norm.
    pub fn score(self, a: &[f32], b: &[f32]) -> ImgMatchResult<f32> {
        if a.len() != b.len() {
            return Err(ImgMatchError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }
        let score = match self {
            Metric::Ssd => ssd(a, b),
            Metric::Intersection => intersection(a, b),
            Metric::IntersectionDistance => 1.0 - intersection(a, b),
            Metric::Cosine => cosine_distance(a, b)?,
        };
        Ok(score as f32)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ImgMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssd" => Ok(Metric::Ssd),
            "intersection" => Ok(Metric::Intersection),
            "intersection_distance" | "intersection-distance" => {
                Ok(Metric::IntersectionDistance)
            }
            "cosine" => Ok(Metric::Cosine),
            _ => Err(ImgMatchError::InvalidInput("unknown metric name")),
        }
    }
}

fn ssd(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum()
}

fn intersection(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x.min(y)))
        .sum()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> ImgMatchResult<f64> {
    let norm_a = l2_norm_f64(a);
    let norm_b = l2_norm_f64(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(ImgMatchError::DegenerateVector {
            reason: "zero-norm vector in cosine distance",
        });
    }
    Ok(1.0 - dot_f64(a, b) / (norm_a * norm_b))
}
