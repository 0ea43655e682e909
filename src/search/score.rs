//! Candidate scoring against past rounds.
//!
//! | Score | Definition |
//! |-------|-----------|
//! | Previous | Linear per-person similarity to `history[0]` |
//! | Weighted | Σ wᵢ·simᵢ / Σ wᵢ over `history[0..4]`, w = [1.0, 0.8, 0.5, 0.2] |
//!
//! Missing history entries drop out of both the sum and the divisor; an
//! empty history scores zero.

use crate::error::GroupingResult;
use crate::models::Permutation;
use crate::similarity::{permutation_similarity, Weighting};

/// Decay weights for the most recent rounds, most recent first.
pub const HISTORY_WEIGHTS: [f64; 4] = [1.0, 0.8, 0.5, 0.2];

/// Scores of one candidate round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    /// Similarity to the previous round (0 if there is none).
    pub previous: f64,
    /// Decayed similarity to the last few rounds.
    pub weighted: f64,
}

impl CandidateScore {
    /// Scores `candidate` against `history` (most recent first).
    pub fn calculate(candidate: &Permutation, history: &[Permutation]) -> GroupingResult<Self> {
        Ok(Self {
            previous: similarity_to_previous(candidate, history)?,
            weighted: weighted_history_similarity(candidate, history)?,
        })
    }

    /// No repeat from the previous round.
    pub fn is_perfect(&self) -> bool {
        self.previous == 0.0
    }
}

/// Linear per-person similarity to `history[0]`; zero for empty history.
pub fn similarity_to_previous(candidate: &Permutation, history: &[Permutation]) -> GroupingResult<f64> {
    match history.first() {
        Some(previous) => {
            Ok(permutation_similarity(candidate, previous, Weighting::Linear)?.per_person_score)
        }
        None => Ok(0.0),
    }
}

/// Weighted mean similarity to the most recent rounds.
pub fn weighted_history_similarity(
    candidate: &Permutation,
    history: &[Permutation],
) -> GroupingResult<f64> {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (round, weight) in history.iter().zip(HISTORY_WEIGHTS) {
        let stats = permutation_similarity(candidate, round, Weighting::Linear)?;
        total += weight * stats.per_person_score;
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        Ok(0.0)
    } else {
        Ok(total / weight_sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grouping;
    use chrono::NaiveDate;

    fn round(d: u32, groups: Vec<Grouping>) -> Permutation {
        Permutation::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), groups)
    }

    fn candidate() -> Permutation {
        round(
            29,
            vec![
                Grouping::new("a", ["b", "c", "d"]),
                Grouping::new("e", ["f", "g", "h"]),
            ],
        )
    }

    fn fresh(d: u32) -> Permutation {
        // Pairs nobody the same way as the candidate.
        round(
            d,
            vec![
                Grouping::new("a", ["e"]),
                Grouping::new("b", ["f"]),
                Grouping::new("c", ["g"]),
                Grouping::new("d", ["h"]),
            ],
        )
    }

    #[test]
    fn test_empty_history() {
        let s = CandidateScore::calculate(&candidate(), &[]).unwrap();
        assert_eq!(s.previous, 0.0);
        assert_eq!(s.weighted, 0.0);
        assert!(s.is_perfect());
    }

    #[test]
    fn test_repeat_of_previous() {
        let history = vec![candidate()];
        let s = CandidateScore::calculate(&candidate(), &history).unwrap();
        assert!((s.previous - 3.0).abs() < 1e-10);
        assert!((s.weighted - 3.0).abs() < 1e-10);
        assert!(!s.is_perfect());
    }

    #[test]
    fn test_weights_decay() {
        // Perfect against the last round, identical to the one before.
        let history = vec![fresh(22), candidate()];
        let s = CandidateScore::calculate(&candidate(), &history).unwrap();
        assert!(s.is_perfect());
        // (1.0 * 0 + 0.8 * 3) / 1.8
        assert!((s.weighted - 2.4 / 1.8).abs() < 1e-10);
    }

    #[test]
    fn test_only_four_rounds_count() {
        let mut history = vec![fresh(22), fresh(15), fresh(8), fresh(1)];
        let base = weighted_history_similarity(&candidate(), &history).unwrap();
        history.push(candidate());
        let extended = weighted_history_similarity(&candidate(), &history).unwrap();
        assert_eq!(base, 0.0);
        assert_eq!(extended, 0.0);
    }
}
