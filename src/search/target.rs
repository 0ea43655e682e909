//! Target-score search.
//!
//! Draws candidates until one scores strictly below the target weighted
//! history similarity (and, unless imperfect results are allowed, has no
//! repeat from the previous round). The loop itself has no bound; a
//! [`SearchControl`] lets the caller cap attempts, set a deadline, or
//! cancel from another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use super::score::CandidateScore;
use super::SearchRequest;
use crate::error::{GroupingError, GroupingResult};
use crate::models::Permutation;

/// Caller-side limits for an otherwise unbounded search.
#[derive(Debug, Clone)]
pub struct SearchControl {
    max_attempts: Option<u64>,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    progress_interval: u64,
}

impl Default for SearchControl {
    fn default() -> Self {
        Self {
            max_attempts: None,
            deadline: None,
            cancel: None,
            progress_interval: 10_000,
        }
    }
}

impl SearchControl {
    /// No limits; progress every 10 000 attempts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops after `max_attempts` candidates.
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Stops once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Stops when `flag` becomes true.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Attempts between progress log lines (minimum 1).
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Attempts between progress log lines.
    pub fn progress_interval(&self) -> u64 {
        self.progress_interval
    }

    /// Whether the search should stop before attempt `attempts + 1`.
    pub fn should_stop(&self, attempts: u64) -> bool {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return true;
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return true;
        }
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Draws candidates until one beats `target_similarity`.
///
/// # Errors
/// - [`GroupingError::InvalidArgument`] for a non-positive or non-finite
///   target, or an invalid request.
/// - [`GroupingError::Interrupted`] when `control` stops the search.
/// - [`GroupingError::Consistency`] if a history round is malformed.
pub fn randomise_until_target<R: Rng + ?Sized>(
    request: &SearchRequest,
    target_similarity: f64,
    control: &SearchControl,
    rng: &mut R,
) -> GroupingResult<Permutation> {
    if !target_similarity.is_finite() || target_similarity <= 0.0 {
        return Err(GroupingError::invalid("target_similarity", target_similarity));
    }
    request.validate()?;
    debug!(target_similarity, history = request.history.len(), "starting target search");

    let mut attempts: u64 = 0;
    let mut best_weighted = f64::INFINITY;

    loop {
        if control.should_stop(attempts) {
            return Err(GroupingError::Interrupted {
                attempts,
                best_score: best_weighted,
            });
        }
        attempts += 1;

        let candidate = request.candidate(rng);
        let score = CandidateScore::calculate(&candidate, &request.history)?;

        if score.weighted < best_weighted {
            best_weighted = score.weighted;
            debug!(attempts, best_weighted, "new best weighted score");
        }

        if score.weighted < target_similarity && (score.is_perfect() || request.allow_imperfect) {
            info!(
                attempts,
                weighted_score = score.weighted,
                previous_score = score.previous,
                "target search accepted a candidate"
            );
            return Ok(candidate);
        }

        if attempts % control.progress_interval() == 0 {
            info!(attempts, best_weighted, target_similarity, "target search progress");
        }
    }
}
