//! Participant roster files.
//!
//! Both the include and exclude files hold one `name,email` pair per line.
//! Exclusions (from the file or passed directly) override inclusions.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GroupingError, GroupingResult};

/// A person on the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Identifier used in rounds.
    pub email: String,
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Included and excluded people for one round.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// People taking part, in file order.
    pub included: Vec<Person>,
    /// People on the include list who sit this round out.
    pub excluded: Vec<Person>,
}

impl Roster {
    /// Splits `people` by the excluded emails.
    pub fn new(people: Vec<Person>, excluded_emails: &[String]) -> Self {
        let (excluded, included): (Vec<Person>, Vec<Person>) = people
            .into_iter()
            .partition(|p| excluded_emails.contains(&p.email));
        for p in &excluded {
            info!(person = %p, "excluding from this round");
        }
        Self { included, excluded }
    }

    /// Reads the include file, the optional exclude file, and extra
    /// excluded emails. A missing exclude file excludes nobody.
    pub fn load(
        include: impl AsRef<Path>,
        exclude: Option<&Path>,
        extra_excluded: &[String],
    ) -> GroupingResult<Self> {
        let people = read_people(include.as_ref())?;
        let mut excluded_emails: Vec<String> = match exclude {
            Some(path) if path.exists() => read_people(path)?
                .into_iter()
                .map(|p| p.email)
                .collect(),
            Some(path) => {
                debug!(path = %path.display(), "exclude file not found");
                Vec::new()
            }
            None => Vec::new(),
        };
        excluded_emails.extend(extra_excluded.iter().cloned());
        Ok(Self::new(people, &excluded_emails))
    }

    /// Emails of everyone taking part.
    pub fn participants(&self) -> Vec<String> {
        self.included.iter().map(|p| p.email.clone()).collect()
    }

    /// `email → name` for everyone taking part.
    pub fn names(&self) -> HashMap<String, String> {
        self.included
            .iter()
            .map(|p| (p.email.clone(), p.name.clone()))
            .collect()
    }
}

/// Parses `name,email` lines. Blank lines are skipped.
pub fn parse_people(text: &str, source: &str) -> GroupingResult<Vec<Person>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match fields.as_slice() {
                [name, email] if !email.is_empty() => Ok(Person {
                    name: name.to_string(),
                    email: email.to_string(),
                }),
                _ => Err(GroupingError::Roster {
                    path: source.to_string(),
                    line: i + 1,
                    message: format!("expected 'name,email', got '{line}'"),
                }),
            }
        })
        .collect()
}

/// Reads and parses a roster file.
pub fn read_people(path: &Path) -> GroupingResult<Vec<Person>> {
    let text = fs::read_to_string(path)?;
    parse_people(&text, &path.display().to_string())
}

/// Splits command-line exclusions on `;` and trims them.
pub fn split_exclusions(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|a| a.split(';'))
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
