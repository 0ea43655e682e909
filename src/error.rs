//! Error types for grouping, search, and persistence.

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the grouping engine and its I/O boundary.
///
/// None of these are retried internally: the caller decides whether to
/// re-run with a larger budget or relaxed target.
#[derive(Error, Debug)]
pub enum GroupingError {
    /// A participant belongs to more than one group in the same round.
    #[error("participant '{participant}' appears in more than one group in the round dated {date}")]
    Consistency {
        date: NaiveDate,
        participant: String,
    },

    /// An argument is out of range or names an unknown option.
    #[error("invalid argument: {field} = {value}")]
    InvalidArgument { field: String, value: String },

    /// Bounded search found no candidate without repeats from the previous round.
    #[error(
        "no candidate out of {attempts} avoided repeats from the round dated {date}; \
         raise the attempt budget or allow imperfect results"
    )]
    ExhaustedAttempts { date: NaiveDate, attempts: usize },

    /// Target search was stopped by its control before reaching the target.
    #[error("search interrupted after {attempts} attempts (best weighted score {best_score:.4})")]
    Interrupted { attempts: u64, best_score: f64 },

    /// Structural problems found in a roster or round.
    #[error("validation failed: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// Malformed line in a roster file.
    #[error("roster error in {path} line {line}: {message}")]
    Roster {
        path: String,
        line: usize,
        message: String,
    },

    /// History directory holds no persisted rounds.
    #[error("no previous rounds found in '{dir}'")]
    EmptyHistory { dir: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl GroupingError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type GroupingResult<T> = Result<T, GroupingError>;
