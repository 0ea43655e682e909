//! Permutation (one complete round of groups).
//!
//! # Persisted format
//!
//! ```json
//! {
//!     "date": "2024-03-18",
//!     "groups": [
//!         { "leader": "a@example.org", "others": ["b@example.org", "c@example.org"] }
//!     ]
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::Grouping;
use crate::error::GroupingResult;
use crate::similarity::{permutation_similarity, PermutationSimilarityStats, Weighting};

/// A complete round: every participant assigned to exactly one group.
///
/// Group order is insertion order and only matters for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation {
    /// The day identifying this round.
    pub date: NaiveDate,
    /// Groups in display order.
    pub groups: Vec<Grouping>,
}

impl Permutation {
    /// Creates a round from its groups.
    pub fn new(date: NaiveDate, groups: Vec<Grouping>) -> Self {
        Self { date, groups }
    }

    /// Union of all groups' participants.
    pub fn participants(&self) -> BTreeSet<&str> {
        self.groups.iter().flat_map(|g| g.participants()).collect()
    }

    /// All groups containing `participant`.
    ///
    /// Holds zero or one element for a well-formed round.
    pub fn groups_of(&self, participant: &str) -> Vec<&Grouping> {
        self.groups
            .iter()
            .filter(|g| g.contains(participant))
            .collect()
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total participants, counting duplicates.
    pub fn participant_count(&self) -> usize {
        self.groups.iter().map(Grouping::len).sum()
    }

    /// Leaders in group order.
    pub fn leaders(&self) -> Vec<&str> {
        self.groups.iter().map(Grouping::leader).collect()
    }

    /// Similarity to another round. See [`permutation_similarity`].
    pub fn similarity_to(
        &self,
        other: &Permutation,
        weighting: Weighting,
    ) -> GroupingResult<PermutationSimilarityStats> {
        permutation_similarity(self, other, weighting)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let members: Vec<&str> = std::iter::once(group.leader())
                .chain(group.others().iter().map(String::as_str))
                .collect();
            write!(f, "Group {}: {}", i + 1, members.join(" | "))?;
        }
        Ok(())
    }
}
