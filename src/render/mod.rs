//! Text and HTML rendering of a round.
//!
//! Identifiers are replaced by display names where a name is known.
//! [`Message`] wraps the group lines in the announcement's greeting and
//! closing note.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::GroupingResult;
use crate::models::{Grouping, Permutation};

const DEFAULT_HEADER: &str = "Hello everyone,\nHere are the groups for the next round.";

const DEFAULT_FOOTER: &str = "The first person in each group is responsible for making sure the \
meeting gets scheduled, but anyone in the group is free to take the initiative.\n\
Please book a 30 minute call and talk about anything you like.";

/// Output format for a rendered round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `Group 1: Leader | Other | ...`, one group per line.
    #[default]
    Text,
    /// Same lines joined with `<br />`, leader in bold.
    Html,
}

fn display<'a>(id: &'a str, names: &'a HashMap<String, String>) -> &'a str {
    names.get(id).map(String::as_str).unwrap_or(id)
}

fn members<'a>(group: &'a Grouping, names: &'a HashMap<String, String>) -> Vec<&'a str> {
    group.others().iter().map(|o| display(o, names)).collect()
}

/// Renders one line per group, leader first.
pub fn render_text(round: &Permutation, names: &HashMap<String, String>) -> String {
    round
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let mut line = format!("Group {}: {}", i + 1, display(g.leader(), names));
            for m in members(g, names) {
                line.push_str(" | ");
                line.push_str(m);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders an HTML fragment with escaped names and bold leaders.
pub fn render_html(round: &Permutation, names: &HashMap<String, String>) -> String {
    round
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let mut line = format!(
                "Group {}: <b>{}</b>",
                i + 1,
                html_escape::encode_text(display(g.leader(), names))
            );
            for m in members(g, names) {
                line.push_str(" | ");
                line.push_str(&html_escape::encode_text(m));
            }
            line.push_str("<br />");
            line
        })
        .collect()
}

/// Renders in `format`.
pub fn render(round: &Permutation, names: &HashMap<String, String>, format: Format) -> String {
    match format {
        Format::Text => render_text(round, names),
        Format::Html => render_html(round, names),
    }
}

/// Announcement text around the group lines.
///
/// Empty parts are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Greeting placed before the groups.
    pub header: String,
    /// Closing note placed after the groups.
    pub footer: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

impl Message {
    /// Default greeting and scheduling note.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the greeting.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Sets the closing note.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Reads the header and footer from files, keeping the defaults for
    /// any path not given.
    pub fn load(header: Option<&Path>, footer: Option<&Path>) -> GroupingResult<Self> {
        let mut message = Self::default();
        if let Some(path) = header {
            message.header = fs::read_to_string(path)?;
        }
        if let Some(path) = footer {
            message.footer = fs::read_to_string(path)?;
        }
        Ok(message)
    }

    /// Renders the header, the groups and the footer in `format`.
    pub fn render(
        &self,
        round: &Permutation,
        names: &HashMap<String, String>,
        format: Format,
    ) -> String {
        let body = render(round, names, format);
        let (header, footer, gap) = match format {
            Format::Text => (
                self.header.trim_end().to_string(),
                self.footer.trim_end().to_string(),
                "\n\n",
            ),
            Format::Html => (html_lines(&self.header), html_lines(&self.footer), "<br />"),
        };
        [header, body, footer]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(gap)
    }
}

fn html_lines(text: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| html_escape::encode_text(line).into_owned())
        .collect::<Vec<_>>()
        .join("<br />")
}
