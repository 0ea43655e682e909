//! Leadership history counts.

use std::collections::HashMap;

use crate::models::Permutation;

/// One person's leadership history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadRecord {
    /// Rounds in which they led a group.
    pub led: usize,
    /// Rounds in which they took part at all.
    pub attended: usize,
}

/// Leadership counts over a set of past rounds.
#[derive(Debug, Clone, Default)]
pub struct LeadTally {
    rounds: usize,
    records: HashMap<String, LeadRecord>,
}

impl LeadTally {
    /// Counts leading and attendance across `history`.
    ///
    /// Anyone seen as a participant gets a record, starting at zero leads.
    pub fn from_history(history: &[Permutation]) -> Self {
        let mut records: HashMap<String, LeadRecord> = HashMap::new();
        for round in history {
            for group in &round.groups {
                for p in group.participants() {
                    records.entry(p.to_string()).or_default().attended += 1;
                }
                records.entry(group.leader().to_string()).or_default().led += 1;
            }
        }
        Self {
            rounds: history.len(),
            records,
        }
    }

    /// Number of rounds counted.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// History record for `participant`; `None` for first-timers.
    pub fn record(&self, participant: &str) -> Option<LeadRecord> {
        self.records.get(participant).copied()
    }

    /// Number of people with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nobody has a record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grouping;
    use chrono::NaiveDate;

    #[test]
    fn test_counts() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let history = vec![
            Permutation::new(d, vec![Grouping::new("a", ["b"]), Grouping::new("c", ["d"])]),
            Permutation::new(d, vec![Grouping::new("a", ["c"]), Grouping::new("b", ["d"])]),
        ];
        let tally = LeadTally::from_history(&history);
        assert_eq!(tally.rounds(), 2);
        assert_eq!(tally.len(), 4);
        assert_eq!(tally.record("a"), Some(LeadRecord { led: 2, attended: 2 }));
        assert_eq!(tally.record("d"), Some(LeadRecord { led: 0, attended: 2 }));
        assert_eq!(tally.record("b"), Some(LeadRecord { led: 1, attended: 2 }));
        assert_eq!(tally.record("e"), None);
    }

    #[test]
    fn test_empty() {
        let tally = LeadTally::from_history(&[]);
        assert!(tally.is_empty());
        assert_eq!(tally.rounds(), 0);
    }
}
