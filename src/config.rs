//! Run configuration.
//!
//! Collects the validated knobs for one round: group size, search policy,
//! leader metric and reporting options.

use std::time::Duration;

use crate::error::{GroupingError, GroupingResult};
use crate::leader::{metric_by_name, LeaderAdjuster};
use crate::render::Format;
use crate::search::{SearchControl, Strategy};
use crate::similarity::Weighting;

/// Settings for generating one round.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target group size.
    pub group_size: usize,
    /// Search policy.
    pub strategy: Strategy,
    /// Accept repeats from the previous round if nothing better turns up.
    pub allow_imperfect: bool,
    /// Leadership metric name (`lead_fraction` or `lead_occasions`).
    pub leader_metric: String,
    /// Weighting used in the similarity report.
    pub weighting: Weighting,
    /// Seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Attempt cap for target search.
    pub max_attempts: Option<u64>,
    /// Wall-clock cap for target search.
    pub timeout: Option<Duration>,
    /// Attempts between target-search progress lines.
    pub progress_interval: u64,
    /// Output format.
    pub format: Format,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            group_size: 4,
            strategy: Strategy::default(),
            allow_imperfect: false,
            leader_metric: "lead_fraction".to_string(),
            weighting: Weighting::Linear,
            seed: None,
            max_attempts: None,
            timeout: None,
            progress_interval: 10_000,
            format: Format::Text,
        }
    }
}

impl RunConfig {
    /// Rejects out-of-range sizes and budgets and unknown names.
    pub fn validate(&self) -> GroupingResult<()> {
        if self.group_size == 0 {
            return Err(GroupingError::invalid("group_size", self.group_size));
        }
        match self.strategy {
            Strategy::BestOf { attempts: 0, .. } => {
                return Err(GroupingError::invalid("attempts", 0));
            }
            Strategy::UntilTarget { target } if !target.is_finite() || target <= 0.0 => {
                return Err(GroupingError::invalid("target", target));
            }
            _ => {}
        }
        if self.max_attempts == Some(0) {
            return Err(GroupingError::invalid("max_attempts", 0));
        }
        if self.progress_interval == 0 {
            return Err(GroupingError::invalid("progress_interval", 0));
        }
        metric_by_name(&self.leader_metric)?;
        Ok(())
    }

    /// Limits for target search.
    pub fn search_control(&self) -> SearchControl {
        let mut control = SearchControl::new().with_progress_interval(self.progress_interval);
        if let Some(max) = self.max_attempts {
            control = control.with_max_attempts(max);
        }
        if let Some(timeout) = self.timeout {
            control = control.with_timeout(timeout);
        }
        control
    }

    /// Leader adjuster for the configured metric.
    pub fn leader_adjuster(&self) -> GroupingResult<LeaderAdjuster> {
        Ok(LeaderAdjuster::new().with_shared_metric(metric_by_name(&self.leader_metric)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            RunConfig {
                group_size: 0,
                ..RunConfig::default()
            },
            RunConfig {
                strategy: Strategy::BestOf {
                    attempts: 0,
                    parallel: false,
                },
                ..RunConfig::default()
            },
            RunConfig {
                strategy: Strategy::UntilTarget { target: 0.0 },
                ..RunConfig::default()
            },
            RunConfig {
                leader_metric: "random".to_string(),
                ..RunConfig::default()
            },
            RunConfig {
                max_attempts: Some(0),
                ..RunConfig::default()
            },
            RunConfig {
                progress_interval: 0,
                ..RunConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(GroupingError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_leader_adjuster_metric() {
        let config = RunConfig {
            leader_metric: "lead_occasions".to_string(),
            ..RunConfig::default()
        };
        assert_eq!(config.leader_adjuster().unwrap().metric().name(), "lead_occasions");
    }

    #[test]
    fn test_search_control_limits() {
        let config = RunConfig {
            max_attempts: Some(5),
            progress_interval: 250,
            ..RunConfig::default()
        };
        let control = config.search_control();
        assert!(!control.should_stop(4));
        assert!(control.should_stop(5));
        assert_eq!(control.progress_interval(), 250);
    }
}
