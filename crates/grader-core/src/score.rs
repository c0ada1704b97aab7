use serde::{Deserialize, Serialize};

use crate::question::{is_gradable, QuestionSet};

/// Result of checking one text against the question list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub completed: usize,
    pub missing: Vec<String>,
}

impl Score {
    /// Score for a file that produced no text at all.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    pub const fn is_zero(&self) -> bool {
        self.completed == 0
    }
}

/// Counts which questions occur verbatim in a piece of extracted text.
///
/// Matching is plain substring containment after whitespace has been
/// collapsed. Identifiers are short canonical tokens like `Exercise 1.01`,
/// and OCR noise is dealt with by the extraction fallback, not here.
#[derive(Debug, Clone)]
pub struct ScoreEvaluator {
    questions: QuestionSet,
}

impl ScoreEvaluator {
    #[must_use]
    pub const fn new(questions: QuestionSet) -> Self {
        Self { questions }
    }

    #[must_use]
    pub const fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn evaluate(&self, text: &str) -> Score {
        let text = normalize_whitespace(text);
        let mut score = Score::zero();

        for question in self.questions.iter().filter(|q| is_gradable(q)) {
            if text.contains(question.trim()) {
                score.completed += 1;
            } else {
                score.missing.push(question.to_string());
            }
        }

        score
    }
}

/// Collapses every whitespace run to a single space.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
