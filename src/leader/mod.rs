//! Leader rotation.
//!
//! Reassigns each group's leader to the member who has led least, judged
//! by a [`LeadershipMetric`] over past rounds. Ties are broken uniformly at
//! random.
//!
//! # Score Convention
//! **Lower score = picked first.**
//!
//! # Usage
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_grouping::leader::{LeaderAdjuster, LeadOccasions};
//! use u_grouping::models::{Grouping, Permutation};
//!
//! let round = Permutation::new(
//!     chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     vec![Grouping::new("a", ["b", "c"])],
//! );
//! let adjuster = LeaderAdjuster::new().with_metric(LeadOccasions);
//! let mut rng = SmallRng::seed_from_u64(1);
//! let adjusted = adjuster.adjust(&round, &[], &mut rng);
//! assert_eq!(adjusted.groups[0].participants(), round.groups[0].participants());
//! ```

mod tally;

pub use tally::{LeadRecord, LeadTally};

use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

use crate::error::{GroupingError, GroupingResult};
use crate::models::Permutation;

/// A fairness metric scoring how much someone has already led.
pub trait LeadershipMetric: Send + Sync + Debug {
    /// Metric name (e.g., "lead_fraction").
    fn name(&self) -> &'static str;

    /// Score for someone with a history record.
    fn score(&self, record: &LeadRecord) -> f64;

    /// Highest score any history-backed person could have.
    fn max_score(&self, tally: &LeadTally) -> f64;
}

/// Raw count of rounds led.
#[derive(Debug, Clone, Copy)]
pub struct LeadOccasions;

impl LeadershipMetric for LeadOccasions {
    fn name(&self) -> &'static str {
        "lead_occasions"
    }

    fn score(&self, record: &LeadRecord) -> f64 {
        record.led as f64
    }

    fn max_score(&self, tally: &LeadTally) -> f64 {
        tally.rounds() as f64
    }
}

/// Rounds led divided by rounds attended, in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct LeadFraction;

impl LeadershipMetric for LeadFraction {
    fn name(&self) -> &'static str {
        "lead_fraction"
    }

    fn score(&self, record: &LeadRecord) -> f64 {
        if record.attended == 0 {
            0.0
        } else {
            record.led as f64 / record.attended as f64
        }
    }

    fn max_score(&self, _tally: &LeadTally) -> f64 {
        1.0
    }
}

/// Looks up a metric by name.
///
/// # Errors
/// [`GroupingError::InvalidArgument`] for unknown names.
pub fn metric_by_name(name: &str) -> GroupingResult<Arc<dyn LeadershipMetric>> {
    match name {
        "lead_occasions" => Ok(Arc::new(LeadOccasions)),
        "lead_fraction" => Ok(Arc::new(LeadFraction)),
        other => Err(GroupingError::invalid("metric", other)),
    }
}

type FirstTimerScore = Arc<dyn Fn(&str) -> f64 + Send + Sync>;

/// Picks leaders by least leadership score.
///
/// People never seen in history are scored by `first_timer_score`; by
/// default they score one above the metric's maximum, so they only lead
/// when nobody else in the group has history.
#[derive(Clone)]
pub struct LeaderAdjuster {
    metric: Arc<dyn LeadershipMetric>,
    first_timer_score: Option<FirstTimerScore>,
    epsilon: f64,
}

impl Debug for LeaderAdjuster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaderAdjuster")
            .field("metric", &self.metric.name())
            .field("custom_first_timer_score", &self.first_timer_score.is_some())
            .finish()
    }
}

impl Default for LeaderAdjuster {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderAdjuster {
    /// Uses [`LeadFraction`] and the default first-timer policy.
    pub fn new() -> Self {
        Self {
            metric: Arc::new(LeadFraction),
            first_timer_score: None,
            epsilon: 1e-9,
        }
    }

    /// Sets the metric.
    pub fn with_metric<M: LeadershipMetric + 'static>(mut self, metric: M) -> Self {
        self.metric = Arc::new(metric);
        self
    }

    /// Sets a shared metric, e.g. from [`metric_by_name`].
    pub fn with_shared_metric(mut self, metric: Arc<dyn LeadershipMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Scores people with no history using `score`.
    pub fn with_first_timer_score<F>(mut self, score: F) -> Self
    where
        F: Fn(&str) -> f64 + Send + Sync + 'static,
    {
        self.first_timer_score = Some(Arc::new(score));
        self
    }

    /// The active metric.
    pub fn metric(&self) -> &dyn LeadershipMetric {
        self.metric.as_ref()
    }

    /// Leadership scores for everyone in `round`.
    pub fn scores(&self, round: &Permutation, tally: &LeadTally) -> Vec<(String, f64)> {
        let default_first_timer = self.metric.max_score(tally) + 1.0;
        round
            .participants()
            .into_iter()
            .map(|p| {
                let score = match tally.record(p) {
                    Some(record) => self.metric.score(&record),
                    None => match &self.first_timer_score {
                        Some(f) => f(p),
                        None => default_first_timer,
                    },
                };
                (p.to_string(), score)
            })
            .collect()
    }

    /// Returns a copy of `round` with each group led by a least-scoring
    /// member. `history` is most recent first; order does not matter here.
    pub fn adjust<R: Rng + ?Sized>(
        &self,
        round: &Permutation,
        history: &[Permutation],
        rng: &mut R,
    ) -> Permutation {
        let tally = LeadTally::from_history(history);
        let scores: std::collections::HashMap<String, f64> =
            self.scores(round, &tally).into_iter().collect();
        let score_of = |p: &str| scores.get(p).copied().unwrap_or(f64::INFINITY);

        let groups = round
            .groups
            .iter()
            .map(|group| {
                let members = group.participants();
                let min = members
                    .iter()
                    .map(|p| score_of(*p))
                    .fold(f64::INFINITY, f64::min);
                let lowest: Vec<&str> = members
                    .iter()
                    .copied()
                    .filter(|p| (score_of(*p) - min).abs() <= self.epsilon)
                    .collect();

                match lowest.choose(rng).and_then(|leader| group.with_leader(leader)) {
                    Some(adjusted) => {
                        if adjusted.leader() != group.leader() {
                            debug!(
                                from = group.leader(),
                                to = adjusted.leader(),
                                score = min,
                                metric = self.metric.name(),
                                "leader reassigned"
                            );
                        }
                        adjusted
                    }
                    None => group.clone(),
                }
            })
            .collect();

        Permutation::new(round.date, groups)
    }
}

/// Reassigns leaders using the metric called `metric`.
///
/// # Errors
/// [`GroupingError::InvalidArgument`] for unknown metric names.
pub fn adjust_leaders<R: Rng + ?Sized>(
    round: &Permutation,
    history: &[Permutation],
    metric: &str,
    rng: &mut R,
) -> GroupingResult<Permutation> {
    let adjuster = LeaderAdjuster::new().with_shared_metric(metric_by_name(metric)?);
    Ok(adjuster.adjust(round, history, rng))
}
