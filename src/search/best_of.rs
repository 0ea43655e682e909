//! Best-of-N search.
//!
//! # Algorithm
//!
//! 1. Draw `n` candidates.
//! 2. Candidates with zero similarity to the previous round are perfect;
//!    among them keep the lowest weighted history score, breaking exact
//!    ties uniformly at random (reservoir sampling).
//! 3. Independently track the candidate closest to the previous round.
//! 4. Return the best perfect candidate, else the closest imperfect one if
//!    allowed, else fail.
//!
//! The parallel variant scans seeded jobs independently and merges them in
//! job order. Tied job bests are combined in proportion to their tie
//! counts, so ties stay uniform over all attempts.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::score::{similarity_to_previous, weighted_history_similarity};
use super::SearchRequest;
use crate::error::{GroupingError, GroupingResult};
use crate::models::Permutation;

const TIE_EPSILON: f64 = 1e-9;

/// Jobs a parallel best-of run is split into, independent of the thread
/// pool size so a seed selects the same round on any machine.
pub const PARALLEL_JOBS: usize = 16;

#[derive(Debug, Clone)]
struct Ranked {
    score: f64,
    round: Permutation,
}

/// Partial result of a scan; merged at a single point for parallel runs.
#[derive(Debug, Clone, Default)]
struct BestOfOutcome {
    best_perfect: Option<Ranked>,
    perfect_ties: u64,
    perfect_count: u64,
    best_imperfect: Option<Ranked>,
}

impl BestOfOutcome {
    fn offer_perfect<R: Rng + ?Sized>(&mut self, score: f64, round: Permutation, rng: &mut R) {
        self.perfect_count += 1;
        match &self.best_perfect {
            Some(best) if score > best.score + TIE_EPSILON => {}
            Some(best) if (score - best.score).abs() <= TIE_EPSILON => {
                self.perfect_ties += 1;
                if rng.random_range(0..self.perfect_ties) == 0 {
                    self.best_perfect = Some(Ranked { score, round });
                }
            }
            _ => {
                self.best_perfect = Some(Ranked { score, round });
                self.perfect_ties = 1;
            }
        }
    }

    fn offer_imperfect(&mut self, score: f64, round: Permutation) {
        if self
            .best_imperfect
            .as_ref()
            .map_or(true, |best| score < best.score)
        {
            self.best_imperfect = Some(Ranked { score, round });
        }
    }

    fn merge<R: Rng + ?Sized>(mut self, other: BestOfOutcome, rng: &mut R) -> BestOfOutcome {
        self.perfect_count += other.perfect_count;
        if let Some(theirs) = other.best_perfect {
            match &self.best_perfect {
                Some(ours) if theirs.score > ours.score + TIE_EPSILON => {}
                Some(ours) if (theirs.score - ours.score).abs() <= TIE_EPSILON => {
                    let total = self.perfect_ties + other.perfect_ties;
                    if rng.random_range(0..total) < other.perfect_ties {
                        self.best_perfect = Some(theirs);
                    }
                    self.perfect_ties = total;
                }
                _ => {
                    self.best_perfect = Some(theirs);
                    self.perfect_ties = other.perfect_ties;
                }
            }
        }
        if let Some(theirs) = other.best_imperfect {
            self.offer_imperfect(theirs.score, theirs.round);
        }
        self
    }
}

fn scan<R: Rng + ?Sized>(
    request: &SearchRequest,
    attempts: usize,
    rng: &mut R,
) -> GroupingResult<BestOfOutcome> {
    let mut outcome = BestOfOutcome::default();
    for _ in 0..attempts {
        let candidate = request.candidate(rng);
        let previous = similarity_to_previous(&candidate, &request.history)?;
        if previous == 0.0 {
            let weighted = weighted_history_similarity(&candidate, &request.history)?;
            outcome.offer_perfect(weighted, candidate, rng);
        } else {
            outcome.offer_imperfect(previous, candidate);
        }
    }
    Ok(outcome)
}

fn finish(
    request: &SearchRequest,
    outcome: BestOfOutcome,
    attempts: usize,
) -> GroupingResult<Permutation> {
    if let Some(best) = outcome.best_perfect {
        info!(
            attempts,
            perfect = outcome.perfect_count,
            weighted_score = best.score,
            "best-of search selected a perfect candidate"
        );
        return Ok(best.round);
    }

    match (outcome.best_imperfect, request.previous()) {
        (Some(best), Some(_)) if request.allow_imperfect => {
            warn!(
                attempts,
                previous_score = best.score,
                "no perfect candidate found; returning closest imperfect one"
            );
            Ok(best.round)
        }
        (_, Some(previous)) => Err(GroupingError::ExhaustedAttempts {
            date: previous.date,
            attempts,
        }),
        // Without history every candidate is perfect, so this only follows
        // a zero-attempt scan, which callers reject up front.
        (_, None) => Err(GroupingError::invalid("n_attempts", attempts)),
    }
}

/// Draws `n_attempts` candidates and returns the best one.
///
/// # Errors
/// - [`GroupingError::InvalidArgument`] if `n_attempts` is zero or the
///   request is invalid.
/// - [`GroupingError::ExhaustedAttempts`] if nothing avoided repeats from
///   the previous round and `allow_imperfect` is off.
/// - [`GroupingError::Consistency`] if a history round is malformed.
pub fn choose_best_of<R: Rng + ?Sized>(
    request: &SearchRequest,
    n_attempts: usize,
    rng: &mut R,
) -> GroupingResult<Permutation> {
    if n_attempts == 0 {
        return Err(GroupingError::invalid("n_attempts", n_attempts));
    }
    request.validate()?;
    debug!(n_attempts, history = request.history.len(), "starting best-of search");

    let outcome = scan(request, n_attempts, rng)?;
    finish(request, outcome, n_attempts)
}

/// Parallel [`choose_best_of`]: splits the attempts into `workers` jobs.
///
/// Each job gets its own generator seeded from `rng`, so runs are
/// reproducible for a fixed seed and job count whatever the thread pool
/// size. Job results are merged in job order.
/// [`Strategy::run`](super::Strategy::run) uses [`PARALLEL_JOBS`].
pub fn choose_best_of_parallel<R: Rng + ?Sized>(
    request: &SearchRequest,
    n_attempts: usize,
    workers: usize,
    rng: &mut R,
) -> GroupingResult<Permutation> {
    if n_attempts == 0 {
        return Err(GroupingError::invalid("n_attempts", n_attempts));
    }
    if workers == 0 {
        return Err(GroupingError::invalid("workers", workers));
    }
    request.validate()?;

    let workers = workers.min(n_attempts);
    let base = n_attempts / workers;
    let extra = n_attempts % workers;
    let jobs: Vec<(usize, u64)> = (0..workers)
        .map(|i| (base + usize::from(i < extra), rng.random()))
        .collect();
    let mut merge_rng = SmallRng::seed_from_u64(rng.random());
    debug!(n_attempts, workers, "starting parallel best-of search");

    let outcomes = jobs
        .into_par_iter()
        .map(|(attempts, seed)| {
            let mut worker_rng = SmallRng::seed_from_u64(seed);
            scan(request, attempts, &mut worker_rng)
        })
        .collect::<GroupingResult<Vec<_>>>()?;

    let merged = outcomes
        .into_iter()
        .fold(BestOfOutcome::default(), |acc, outcome| {
            acc.merge(outcome, &mut merge_rng)
        });
    finish(request, merged, n_attempts)
}
