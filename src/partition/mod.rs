//! Randomized partitioning of a roster into groups.
//!
//! # Algorithm
//!
//! 1. Shuffle the roster uniformly.
//! 2. Cut `q = n / group_size` full groups; the first member of each
//!    becomes its leader.
//! 3. Hand the `r = n % group_size` leftovers to distinct, randomly chosen
//!    groups as extra members.
//!
//! When `r > q` the leftovers are handed out in passes, each pass drawing
//! distinct groups without replacement, so a group may receive more than one
//! extra member (at most `ceil(r / q)`).
//!
//! # Complexity
//! O(n) per call.

use chrono::{Local, NaiveDate};
use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::error::{GroupingError, GroupingResult};
use crate::models::{Grouping, Permutation};
use crate::validation::validate_roster;

/// Produces random rounds of a fixed target group size.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_grouping::partition::Partitioner;
///
/// let roster = ["a", "b", "c", "d", "e", "f", "g", "h"];
/// let mut rng = SmallRng::seed_from_u64(7);
/// let round = Partitioner::new(4).randomise(&roster, &mut rng).unwrap();
/// assert_eq!(round.group_count(), 2);
/// assert_eq!(round.participants().len(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct Partitioner {
    group_size: usize,
    date: Option<NaiveDate>,
}

impl Partitioner {
    /// Creates a partitioner for groups of `group_size`.
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            date: None,
        }
    }

    /// Stamps generated rounds with `date` instead of today.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Target group size.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Checks that `participant_count` people can form at least one group.
    pub fn check(&self, participant_count: usize) -> GroupingResult<()> {
        if self.group_size == 0 {
            return Err(GroupingError::invalid("group_size", self.group_size));
        }
        if participant_count < self.group_size {
            return Err(GroupingError::invalid(
                "participants",
                format!(
                    "{participant_count} (fewer than one group of {})",
                    self.group_size
                ),
            ));
        }
        Ok(())
    }

    /// Produces one random round.
    ///
    /// # Errors
    /// - [`GroupingError::InvalidArgument`] for a zero group size or fewer
    ///   participants than one group.
    /// - [`GroupingError::Validation`] for duplicate or blank identifiers.
    pub fn randomise<R, S>(&self, participants: &[S], rng: &mut R) -> GroupingResult<Permutation>
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        self.check(participants.len())?;
        validate_roster(participants).map_err(GroupingError::Validation)?;
        Ok(self.randomise_unchecked(participants, rng))
    }

    /// Same as [`randomise`](Self::randomise) without re-validating the
    /// roster. Callers must have run [`check`](Self::check) and
    /// [`validate_roster`] already.
    pub(crate) fn randomise_unchecked<R, S>(&self, participants: &[S], rng: &mut R) -> Permutation
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        let mut pool: Vec<&str> = participants.iter().map(AsRef::as_ref).collect();
        pool.shuffle(rng);

        let full = pool.len() / self.group_size;
        let split = full * self.group_size;
        let (heads, leftovers) = pool.split_at(split);

        let mut groups: Vec<Grouping> = heads
            .chunks_exact(self.group_size)
            .filter_map(|chunk| {
                let (leader, others) = chunk.split_first()?;
                Some(Grouping::new(*leader, others.iter().copied()))
            })
            .collect();

        for (target, person) in remainder_targets(full, leftovers.len(), rng)
            .into_iter()
            .zip(leftovers)
        {
            groups[target] = groups[target].with_member(*person);
        }

        Permutation::new(self.date.unwrap_or_else(today), groups)
    }
}

/// Convenience wrapper: one random round for `group_size`.
pub fn randomise<R, S>(participants: &[S], group_size: usize, rng: &mut R) -> GroupingResult<Permutation>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    Partitioner::new(group_size).randomise(participants, rng)
}

/// Picks a group index for each leftover, distinct within each pass of
/// `groups` draws.
fn remainder_targets<R: Rng + ?Sized>(groups: usize, leftovers: usize, rng: &mut R) -> Vec<usize> {
    let mut targets = Vec::with_capacity(leftovers);
    if groups == 0 {
        return targets;
    }
    while targets.len() < leftovers {
        let batch = (leftovers - targets.len()).min(groups);
        targets.extend(index::sample(rng, groups, batch).into_iter());
    }
    targets
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
