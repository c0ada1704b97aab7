use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Roster not found: {0}")]
    NotFound(String),
    #[error("Could not read roster {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

pub type RosterResult<T> = Result<T, RosterError>;

/// A canonical student name such as `Doe, Jane`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
}

impl RosterEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn compact_key(&self) -> String {
        compact_key(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    #[must_use]
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn parse(contents: &str) -> Self {
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect()
    }

    /// Reads a roster file. A missing file is reported as
    /// [`RosterError::NotFound`] so callers can skip pairing.
    pub async fn load(path: &Path) -> RosterResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RosterError::NotFound(path.display().to_string()))
            }
            Err(source) => Err(RosterError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Roster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(RosterEntry::new).collect())
    }
}

/// `"Doe, Jane"` -> `"doejane"`: every comma and space removed, then
/// lower-cased.
#[must_use]
pub fn compact_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ',' && *c != ' ')
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_key() {
        assert_eq!(compact_key("Doe, Jane"), "doejane");
        assert_eq!(compact_key("Van Der Berg, Anna Marie"), "vanderbergannamarie");
        assert_eq!(compact_key("O'Neil,Pat"), "o'neilpat");
        assert_eq!(compact_key(""), "");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let roster = Roster::parse("Doe, Jane\n\nSmith, John\n");

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.entries()[1].compact_key(), "smithjohn");
    }

    #[tokio::test]
    async fn test_load_missing_roster() {
        let result = Roster::load(Path::new("/nonexistent/names.txt")).await;

        assert!(matches!(result, Err(RosterError::NotFound(_))));
    }
}
