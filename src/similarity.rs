//! Pairwise-overlap similarity between groups and rounds.
//!
//! # Metric
//!
//! For each person taking part in both rounds, count how many *other*
//! people shared their group in both rounds. The round score is the mean
//! of these counts (optionally squared) over everyone in either round.
//!
//! Quadratic weighting penalises one near-identical group more heavily
//! than several groups that each repeat a single pairing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{GroupingError, GroupingResult};
use crate::models::{Grouping, Permutation};

/// How per-person repeat counts are combined into a round score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Sum of counts.
    #[default]
    Linear,
    /// Sum of squared counts.
    Quadratic,
}

impl Weighting {
    /// Contribution of one person's repeat count.
    #[inline]
    pub fn apply(self, count: usize) -> f64 {
        match self {
            Weighting::Linear => count as f64,
            Weighting::Quadratic => (count * count) as f64,
        }
    }
}

impl FromStr for Weighting {
    type Err = GroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Weighting::Linear),
            "quadratic" => Ok(Weighting::Quadratic),
            other => Err(GroupingError::invalid("weighting", other)),
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Weighting::Linear => "linear",
            Weighting::Quadratic => "quadratic",
        })
    }
}

/// Result of comparing two rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationSimilarityStats {
    /// Mean (weighted) repeat count over the union of both rounds' participants.
    pub per_person_score: f64,
    /// Participants with a nonzero repeat count, and that count.
    pub persons_with_repeats: BTreeMap<String, usize>,
}

impl PermutationSimilarityStats {
    /// Whether no pairing was repeated.
    pub fn is_perfect(&self) -> bool {
        self.persons_with_repeats.is_empty()
    }
}

impl fmt::Display for PermutationSimilarityStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "per_person_score")?;
        writeln!(f, "    {:.4}", self.per_person_score)?;
        write!(f, "persons_with_repeats")?;
        if self.persons_with_repeats.is_empty() {
            return write!(f, "\n    none");
        }
        let mut sorted: Vec<(&String, &usize)> = self.persons_with_repeats.iter().collect();
        sorted.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        for (person, count) in sorted {
            write!(f, "\n    {count} for {person}")?;
        }
        Ok(())
    }
}

/// Number of people shared by two groups, ignoring `excluding`.
///
/// Symmetric; zero iff the groups share nobody outside `excluding`.
pub fn similarity(a: &Grouping, b: &Grouping, excluding: &BTreeSet<&str>) -> usize {
    a.participants()
        .into_iter()
        .filter(|p| !excluding.contains(p) && b.contains(p))
        .count()
}

/// Compares two rounds person by person.
///
/// People absent from either round contribute zero but still count in the
/// denominator.
///
/// # Errors
/// [`GroupingError::Consistency`] if anyone sits in more than one group
/// of the same round.
pub fn permutation_similarity(
    p: &Permutation,
    q: &Permutation,
    weighting: Weighting,
) -> GroupingResult<PermutationSimilarityStats> {
    let all: BTreeSet<&str> = p.participants().union(&q.participants()).copied().collect();
    let mut score_total = 0.0;
    let mut persons_with_repeats = BTreeMap::new();

    for &person in &all {
        let gp = single_group(p, person)?;
        let gq = single_group(q, person)?;
        let (Some(gp), Some(gq)) = (gp, gq) else {
            continue;
        };

        let s = similarity(gp, gq, &BTreeSet::from([person]));
        if s > 0 {
            persons_with_repeats.insert(person.to_string(), s);
        }
        score_total += weighting.apply(s);
    }

    let per_person_score = if all.is_empty() {
        0.0
    } else {
        score_total / all.len() as f64
    };

    Ok(PermutationSimilarityStats {
        per_person_score,
        persons_with_repeats,
    })
}

fn single_group<'a>(round: &'a Permutation, person: &str) -> GroupingResult<Option<&'a Grouping>> {
    match round.groups_of(person).as_slice() {
        [] => Ok(None),
        [group] => Ok(Some(*group)),
        _ => Err(GroupingError::Consistency {
            date: round.date,
            participant: person.to_string(),
        }),
    }
}
