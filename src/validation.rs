//! Input validation for rosters and rounds.
//!
//! Checks structural integrity before grouping or comparison. Detects:
//! - Duplicate participants (in a roster, or across groups of one round)
//! - Empty rosters and blank identifiers
//!
//! All problems are collected rather than stopping at the first.

use crate::models::Permutation;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A participant appears more than once.
    DuplicateParticipant,
    /// Nobody to group.
    EmptyRoster,
    /// A participant identifier is empty or whitespace.
    EmptyIdentifier,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a participant roster.
///
/// Checks:
/// 1. At least one participant
/// 2. No blank identifiers
/// 3. No duplicate identifiers
pub fn validate_roster<S: AsRef<str>>(participants: &[S]) -> ValidationResult {
    let mut errors = Vec::new();

    if participants.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "Roster has no participants",
        ));
    }

    let mut seen = HashSet::new();
    for (i, p) in participants.iter().enumerate() {
        let p = p.as_ref();
        if p.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyIdentifier,
                format!("Blank participant identifier at position {i}"),
            ));
            continue;
        }
        if !seen.insert(p) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateParticipant,
                format!("Duplicate participant in roster: {p}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates one round.
///
/// Checks:
/// 1. No participant in more than one group
/// 2. No blank identifiers
pub fn validate_permutation(permutation: &Permutation) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, group) in permutation.groups.iter().enumerate() {
        for p in group.participants() {
            if p.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyIdentifier,
                    format!("Blank identifier in group {} of round {}", i + 1, permutation.date),
                ));
            } else if !seen.insert(p) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateParticipant,
                    format!(
                        "Participant '{p}' is in more than one group in round {}",
                        permutation.date
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grouping;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn test_valid_roster() {
        assert!(validate_roster(&["a", "b", "c"]).is_ok());
    }

    #[test]
    fn test_empty_roster() {
        let errors = validate_roster::<&str>(&[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyRoster));
    }

    #[test]
    fn test_duplicate_in_roster() {
        let errors = validate_roster(&["a", "b", "a"]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateParticipant);
        assert!(errors[0].message.contains('a'));
    }

    #[test]
    fn test_blank_identifier() {
        let errors = validate_roster(&["a", "  "]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyIdentifier));
    }

    #[test]
    fn test_valid_permutation() {
        let p = Permutation::new(
            date(),
            vec![Grouping::new("a", ["b"]), Grouping::new("c", ["d"])],
        );
        assert!(validate_permutation(&p).is_ok());
    }

    #[test]
    fn test_participant_in_two_groups() {
        let p = Permutation::new(
            date(),
            vec![Grouping::new("a", ["b"]), Grouping::new("c", ["b"])],
        );
        let errors = validate_permutation(&p).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateParticipant
                && e.message.contains("2024-05-06")));
    }

    #[test]
    fn test_multiple_errors() {
        let p = Permutation::new(
            date(),
            vec![
                Grouping::new("a", ["b", ""]),
                Grouping::new("c", ["a"]),
                Grouping::new("d", ["b"]),
            ],
        );
        let errors = validate_permutation(&p).unwrap_err();
        // blank id, 'a' twice, 'b' twice
        assert_eq!(errors.len(), 3);
    }
}
