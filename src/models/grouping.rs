//! Grouping (one group within a round).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ParticipantId;

/// One group: a leader plus the other members.
///
/// The leader is never duplicated in `others`. Size constraints come from
/// the partitioner, not from this type, so a leader-only group is legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroupingRecord", into = "GroupingRecord")]
pub struct Grouping {
    leader: ParticipantId,
    others: BTreeSet<ParticipantId>,
}

/// Persisted shape of a group: `{"leader": str, "others": [str, ...]}`.
#[derive(Serialize, Deserialize)]
struct GroupingRecord {
    leader: String,
    others: Vec<String>,
}

impl TryFrom<GroupingRecord> for Grouping {
    type Error = String;

    fn try_from(record: GroupingRecord) -> Result<Self, Self::Error> {
        if record.others.iter().any(|o| *o == record.leader) {
            return Err(format!(
                "leader '{}' is also listed in others",
                record.leader
            ));
        }
        Ok(Self {
            leader: record.leader,
            others: record.others.into_iter().collect(),
        })
    }
}

impl From<Grouping> for GroupingRecord {
    fn from(grouping: Grouping) -> Self {
        Self {
            leader: grouping.leader,
            others: grouping.others.into_iter().collect(),
        }
    }
}

impl Grouping {
    /// Creates a group. A copy of the leader inside `others` is dropped.
    pub fn new<I, S>(leader: impl Into<String>, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let leader = leader.into();
        let others = others
            .into_iter()
            .map(Into::into)
            .filter(|o: &String| *o != leader)
            .collect();
        Self { leader, others }
    }

    /// The group leader.
    pub fn leader(&self) -> &str {
        &self.leader
    }

    /// Members other than the leader.
    pub fn others(&self) -> &BTreeSet<ParticipantId> {
        &self.others
    }

    /// `{leader} ∪ others`.
    pub fn participants(&self) -> BTreeSet<&str> {
        std::iter::once(self.leader.as_str())
            .chain(self.others.iter().map(String::as_str))
            .collect()
    }

    /// Whether `participant` is in this group.
    pub fn contains(&self, participant: &str) -> bool {
        self.leader == participant || self.others.contains(participant)
    }

    /// Number of participants including the leader.
    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    /// Always false; a group has at least its leader.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns a new group with `participant` added to `others`.
    pub fn with_member(&self, participant: impl Into<String>) -> Self {
        let mut next = self.clone();
        let participant = participant.into();
        if participant != next.leader {
            next.others.insert(participant);
        }
        next
    }

    /// Returns a copy of this group led by `new_leader`.
    ///
    /// `None` if `new_leader` is not a member.
    pub fn with_leader(&self, new_leader: &str) -> Option<Self> {
        if !self.contains(new_leader) {
            return None;
        }
        let others: Vec<&str> = self
            .participants()
            .into_iter()
            .filter(|p| *p != new_leader)
            .collect();
        Some(Self::new(new_leader, others))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_drops_leader_from_others() {
        let g = Grouping::new("a", ["a", "b", "c"]);
        assert_eq!(g.leader(), "a");
        assert_eq!(g.others().len(), 2);
        assert_eq!(g.len(), 3);
        assert!(!g.others().contains("a"));
    }

    #[test]
    fn test_participants_and_contains() {
        let g = Grouping::new("a", ["b", "c"]);
        let p = g.participants();
        assert_eq!(p, BTreeSet::from(["a", "b", "c"]));
        assert!(g.contains("a"));
        assert!(g.contains("c"));
        assert!(!g.contains("d"));
    }

    #[test]
    fn test_with_leader() {
        let g = Grouping::new("a", ["b", "c"]);
        let h = g.with_leader("c").unwrap();
        assert_eq!(h.leader(), "c");
        assert_eq!(h.participants(), g.participants());
        // Original untouched
        assert_eq!(g.leader(), "a");
        assert!(g.with_leader("z").is_none());
    }

    #[test]
    fn test_with_member() {
        let g = Grouping::new("a", ["b"]);
        let h = g.with_member("c");
        assert_eq!(h.len(), 3);
        assert_eq!(g.len(), 2);
        assert_eq!(h.with_member("a").len(), 3);
    }

    #[test]
    fn test_serde_shape() {
        let g = Grouping::new("a", ["c", "b"]);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["leader"], "a");
        assert_eq!(json["others"], serde_json::json!(["b", "c"]));

        let back: Grouping = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_deserialize_rejects_leader_in_others() {
        let json = r#"{"leader": "a", "others": ["a", "b"]}"#;
        let err = serde_json::from_str::<Grouping>(json).unwrap_err();
        assert!(err.to_string().contains("leader 'a'"));
    }
}
