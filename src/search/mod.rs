//! History-aware search for low-repeat rounds.
//!
//! Both policies draw candidates from the [`Partitioner`] and score them
//! against past rounds (most recent first). Neither guarantees a global
//! optimum: they are bounded or target-driven random searches.
//!
//! # Policies
//!
//! - **Best of N** ([`choose_best_of`]): draw a fixed number of candidates,
//!   keep those with no repeat from the previous round ("perfect"), and
//!   return the one with the lowest weighted history score.
//! - **Until target** ([`randomise_until_target`]): draw until a candidate's
//!   weighted history score drops below a target. Unbounded unless the
//!   caller supplies a [`SearchControl`] limit.
//!
//! # Scoring
//!
//! See [`CandidateScore`] for the previous-round and weighted history scores.

mod best_of;
mod score;
mod target;

pub use best_of::{choose_best_of, choose_best_of_parallel, PARALLEL_JOBS};
pub use score::{similarity_to_previous, weighted_history_similarity, CandidateScore, HISTORY_WEIGHTS};
pub use target::{randomise_until_target, SearchControl};

use chrono::NaiveDate;
use rand::Rng;

use crate::error::{GroupingError, GroupingResult};
use crate::models::Permutation;
use crate::partition::Partitioner;
use crate::validation::validate_roster;

/// Input container for a search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Participants to group.
    pub participants: Vec<String>,
    /// Past rounds, most recent first. May be empty.
    pub history: Vec<Permutation>,
    /// Candidate generator.
    pub partitioner: Partitioner,
    /// Accept candidates that repeat pairings from the previous round.
    pub allow_imperfect: bool,
}

impl SearchRequest {
    /// Creates a request with no history.
    pub fn new<I, S>(participants: I, group_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
            history: Vec::new(),
            partitioner: Partitioner::new(group_size),
            allow_imperfect: false,
        }
    }

    /// Sets past rounds (most recent first).
    pub fn with_history(mut self, history: Vec<Permutation>) -> Self {
        self.history = history;
        self
    }

    /// Allows or forbids repeats from the previous round.
    pub fn with_allow_imperfect(mut self, allow: bool) -> Self {
        self.allow_imperfect = allow;
        self
    }

    /// Stamps candidates with `date` instead of today.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.partitioner = self.partitioner.with_date(date);
        self
    }

    /// The round the candidates are compared against first.
    pub fn previous(&self) -> Option<&Permutation> {
        self.history.first()
    }

    /// Checks group size and roster once, before any candidate is drawn.
    pub fn validate(&self) -> GroupingResult<()> {
        self.partitioner.check(self.participants.len())?;
        validate_roster(&self.participants).map_err(GroupingError::Validation)
    }

    pub(crate) fn candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Permutation {
        self.partitioner.randomise_unchecked(&self.participants, rng)
    }
}

/// Runtime-selectable search policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Draw `attempts` candidates and keep the best.
    BestOf {
        attempts: usize,
        /// Spread attempts over the rayon thread pool.
        parallel: bool,
    },
    /// Draw until the weighted history score is below `target`.
    UntilTarget { target: f64 },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::BestOf {
            attempts: 100_000,
            parallel: false,
        }
    }
}

impl Strategy {
    /// Runs the selected policy.
    ///
    /// `control` only applies to [`Strategy::UntilTarget`].
    pub fn run<R: Rng + ?Sized>(
        &self,
        request: &SearchRequest,
        control: &SearchControl,
        rng: &mut R,
    ) -> GroupingResult<Permutation> {
        match *self {
            Strategy::BestOf {
                attempts,
                parallel: false,
            } => choose_best_of(request, attempts, rng),
            Strategy::BestOf {
                attempts,
                parallel: true,
            } => choose_best_of_parallel(request, attempts, PARALLEL_JOBS, rng),
            Strategy::UntilTarget { target } => {
                randomise_until_target(request, target, control, rng)
            }
        }
    }
}
