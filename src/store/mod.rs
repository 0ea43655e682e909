//! JSON persistence of rounds.
//!
//! One round per file, named `<date>.json`, in a history directory. The
//! most recently saved round is also copied to `.latest.json`, which
//! history loading skips.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{GroupingError, GroupingResult};
use crate::models::Permutation;
use crate::validation::validate_permutation;

/// Name of the copy of the last saved round.
pub const LATEST_FILE: &str = ".latest.json";

/// Serializes a round with four-space indentation.
pub fn to_json(round: &Permutation) -> GroupingResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    round.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Parses and validates a round.
///
/// # Errors
/// [`GroupingError::Json`] for malformed input, [`GroupingError::Validation`]
/// if someone sits in two groups.
pub fn from_json(json: &str) -> GroupingResult<Permutation> {
    let round: Permutation = serde_json::from_str(json)?;
    validate_permutation(&round).map_err(GroupingError::Validation)?;
    Ok(round)
}

/// Reads one round from `path`.
pub fn load_round(path: impl AsRef<Path>) -> GroupingResult<Permutation> {
    let text = fs::read_to_string(path.as_ref())?;
    from_json(&text)
}

/// Writes `round` to `<dir>/<date>.json` and refreshes `.latest.json`.
///
/// Returns the dated file's path.
pub fn save_round(dir: impl AsRef<Path>, round: &Permutation) -> GroupingResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let json = to_json(round)?;

    let path = dir.join(format!("{}.json", round.date.format("%Y-%m-%d")));
    fs::write(&path, &json)?;
    fs::write(dir.join(LATEST_FILE), &json)?;
    info!(path = %path.display(), groups = round.group_count(), "saved round");
    Ok(path)
}

/// Loads every saved round in `dir`, most recent first.
///
/// # Errors
/// [`GroupingError::EmptyHistory`] if the directory holds no rounds.
pub fn load_history(dir: impl AsRef<Path>) -> GroupingResult<Vec<Permutation>> {
    let dir = dir.as_ref();
    let mut rounds = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_round = path.is_file()
            && path.extension().is_some_and(|ext| ext == "json")
            && path.file_name().is_some_and(|name| name != LATEST_FILE);
        if is_round {
            debug!(path = %path.display(), "loading round");
            rounds.push(load_round(&path)?);
        }
    }

    if rounds.is_empty() {
        return Err(GroupingError::EmptyHistory {
            dir: dir.display().to_string(),
        });
    }
    rounds.sort_by(|a, b| b.date.cmp(&a.date));
    info!(rounds = rounds.len(), dir = %dir.display(), "loaded history");
    Ok(rounds)
}

/// Like [`load_history`], but a missing or empty directory means no
/// history (the first round ever).
pub fn load_history_or_empty(dir: impl AsRef<Path>) -> GroupingResult<Vec<Permutation>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        info!(dir = %dir.display(), "no history directory; treating as first round");
        return Ok(Vec::new());
    }
    match load_history(dir) {
        Err(GroupingError::EmptyHistory { .. }) => Ok(Vec::new()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grouping;
    use chrono::NaiveDate;

    fn sample() -> Permutation {
        Permutation::new(
            NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
            vec![
                Grouping::new("a@x.org", ["b@x.org", "c@x.org"]),
                Grouping::new("d@x.org", ["e@x.org"]),
            ],
        )
    }

    #[test]
    fn test_to_json_layout() {
        let json = to_json(&sample()).unwrap();
        assert!(json.starts_with("{\n    \"date\": \"2024-03-18\""));
        assert!(json.contains("\"leader\": \"a@x.org\""));
    }

    #[test]
    fn test_to_json_keeps_non_ascii_identifiers() {
        let round = Permutation::new(
            NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
            vec![Grouping::new("zoë@x.org", ["józef@x.org"])],
        );
        let json = to_json(&round).unwrap();
        assert!(json.contains("\"leader\": \"zoë@x.org\""));
        assert!(!json.contains('\u{FFFD}'));
        assert_eq!(from_json(&json).unwrap(), round);
    }

    #[test]
    fn test_json_round_trip() {
        let round = sample();
        let back = from_json(&to_json(&round).unwrap()).unwrap();
        assert_eq!(back, round);
    }

    #[test]
    fn test_from_json_accepts_unordered_others() {
        let json = r#"{"date": "2023-11-06", "groups": [
            {"leader": "a", "others": ["c", "b"]}
        ]}"#;
        let round = from_json(json).unwrap();
        assert_eq!(round.groups[0], Grouping::new("a", ["b", "c"]));
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let json = r#"{"date": "2023-11-06", "groups": [
            {"leader": "a", "others": ["b"]},
            {"leader": "c", "others": ["b"]}
        ]}"#;
        assert!(matches!(from_json(json), Err(GroupingError::Validation(_))));
    }

    #[test]
    fn test_from_json_rejects_bad_date() {
        let json = r#"{"date": "06/11/2023", "groups": []}"#;
        assert!(matches!(from_json(json), Err(GroupingError::Json(_))));
    }
}
