use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::shorthand::{self, ShorthandError};

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("Could not read question list {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not write question list {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid shorthand listing: {0}")]
    Shorthand(#[from] ShorthandError),
}

pub type QuestionResult<T> = Result<T, QuestionError>;

/// Ordered list of exercise identifiers, exactly as they appear in the
/// question file. Blank lines are kept here and skipped during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    questions: Vec<String>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(questions: Vec<String>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn parse(contents: &str) -> Self {
        Self::new(contents.lines().map(String::from).collect())
    }

    pub async fn load(path: &Path) -> QuestionResult<Self> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| QuestionError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
        Ok(Self::parse(&contents))
    }

    /// Expands a listing like `sc 1.1, 1.2 ex 3.4` into `Self-Check 1.01`,
    /// `Self-Check 1.02`, `Exercise 3.04`.
    pub fn from_shorthand(listing: &str) -> QuestionResult<Self> {
        Ok(Self::new(shorthand::expand(listing)?))
    }

    /// Appends one question per line to `path`, creating it if needed.
    pub async fn append_to(&self, path: &Path) -> QuestionResult<()> {
        let write_error = |source| QuestionError::Write {
            path: path.display().to_string(),
            source,
        };

        let mut contents = String::new();
        for question in self.iter() {
            contents.push_str(question);
            contents.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(write_error)?;
        file.write_all(contents.as_bytes()).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }

    /// Questions that take part in scoring.
    pub fn gradable(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|q| is_gradable(q))
    }

    pub fn gradable_count(&self) -> usize {
        self.gradable().count()
    }

    pub fn is_empty(&self) -> bool {
        self.gradable_count() == 0
    }
}

impl<S: Into<String>> FromIterator<S> for QuestionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

pub(crate) fn is_gradable(question: &str) -> bool {
    !question.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_and_blank_lines() {
        let set = QuestionSet::parse("Exercise 1.1\n\nExercise 2.3\n");

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["Exercise 1.1", "", "Exercise 2.3"]
        );
        assert_eq!(set.gradable_count(), 2);
    }

    #[test]
    fn test_whitespace_only_lines_are_not_gradable() {
        let set: QuestionSet = ["   ", "\t", ""].into_iter().collect();

        assert!(set.is_empty());
    }

    #[test]
    fn test_from_shorthand() {
        let set = QuestionSet::from_shorthand("sc 1.1, 1.2, ex 3.4,").unwrap();

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["Self-Check 1.01", "Self-Check 1.02", "Exercise 3.04"]
        );
    }

    #[test]
    fn test_from_shorthand_rejects_garbage() {
        let result = QuestionSet::from_shorthand("ex 1.1 chapter");

        assert!(matches!(
            result,
            Err(QuestionError::Shorthand(ShorthandError::InvalidNumber(_)))
        ));
    }

    #[tokio::test]
    async fn test_append_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        tokio::fs::write(&path, "Exercise 1.01\n").await.unwrap();

        QuestionSet::from_shorthand("sc 2.3")
            .unwrap()
            .append_to(&path)
            .await
            .unwrap();
        let set = QuestionSet::load(&path).await.unwrap();

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["Exercise 1.01", "Self-Check 2.03"]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = QuestionSet::load(Path::new("/nonexistent/questions.txt")).await;

        assert!(matches!(result, Err(QuestionError::Read { .. })));
    }
}
