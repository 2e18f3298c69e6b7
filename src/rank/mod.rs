//! Deterministic ordering of scored matches.
//!
//! Scores are compared with `total_cmp` in the metric's direction; equal
//! scores fall back to ascending lexical image id so rankings are
//! reproducible regardless of store order.

use crate::metric::Direction;
use std::cmp::Ordering;

/// Score assigned to one stored image.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedMatch {
    /// Metric score for this image.
    pub score: f32,
    /// Id of the stored image.
    pub image_id: String,
}

impl RankedMatch {
    pub fn new(score: f32, image_id: impl Into<String>) -> Self {
        Self {
            score,
            image_id: image_id.into(),
        }
    }
}

fn match_cmp(direction: Direction, a: &RankedMatch, b: &RankedMatch) -> Ordering {
    let by_score = match direction {
        Direction::Ascending => a.score.total_cmp(&b.score),
        Direction::Descending => b.score.total_cmp(&a.score),
    };
    by_score.then_with(|| a.image_id.cmp(&b.image_id))
}

/// Sorts matches best-first with deterministic tie-breaking.
pub fn sort_matches(matches: &mut [RankedMatch], direction: Direction) {
    matches.sort_by(|a, b| match_cmp(direction, a, b));
}

/// Best and worst ends of a ranked list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranking {
    /// Up to `k` best matches, best first.
    pub best: Vec<RankedMatch>,
    /// Up to `least` worst matches, worst first.
    pub worst: Vec<RankedMatch>,
    /// Records that could not be scored.
    pub skipped: usize,
}

/// Sorts `matches` and keeps the first `k` and the last `least` entries.
///
/// `k` or `least` larger than the list returns the whole list.
pub fn select_extremes(
    mut matches: Vec<RankedMatch>,
    direction: Direction,
    k: usize,
    least: usize,
) -> Ranking {
    sort_matches(&mut matches, direction);
    let worst = matches.iter().rev().take(least).cloned().collect();
    matches.truncate(k);
    Ranking {
        best: matches,
        worst,
        skipped: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{select_extremes, sort_matches, RankedMatch};
    use crate::metric::Direction;

    fn ids(matches: &[RankedMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.image_id.as_str()).collect()
    }

    #[test]
    fn ties_break_by_image_id_in_both_directions() {
        let mut matches = vec![
            RankedMatch::new(1.0, "c"),
            RankedMatch::new(1.0, "a"),
            RankedMatch::new(0.5, "b"),
        ];
        sort_matches(&mut matches, Direction::Ascending);
        assert_eq!(ids(&matches), vec!["b", "a", "c"]);
        sort_matches(&mut matches, Direction::Descending);
        assert_eq!(ids(&matches), vec!["a", "c", "b"]);
    }

    #[test]
    fn extremes_report_worst_first() {
        let matches = vec![
            RankedMatch::new(0.1, "a"),
            RankedMatch::new(0.9, "b"),
            RankedMatch::new(0.5, "c"),
            RankedMatch::new(0.7, "d"),
        ];
        let ranking = select_extremes(matches, Direction::Ascending, 2, 2);
        assert_eq!(ids(&ranking.best), vec!["a", "c"]);
        assert_eq!(ids(&ranking.worst), vec!["b", "d"]);
    }

    #[test]
    fn oversized_k_returns_everything() {
        let matches = vec![RankedMatch::new(2.0, "a"), RankedMatch::new(1.0, "b")];
        let ranking = select_extremes(matches, Direction::Descending, 10, 0);
        assert_eq!(ids(&ranking.best), vec!["a", "b"]);
        assert!(ranking.worst.is_empty());
    }
}
