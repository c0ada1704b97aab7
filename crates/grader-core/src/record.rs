use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::ExtractionMethod;
use crate::score::Score;

/// Document category reported in the output tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Unknown,
    Image,
    Pdf,
    ImagePdf,
}

impl SourceType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::ImagePdf => "image pdf",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Option<ExtractionMethod>> for SourceType {
    fn from(method: Option<ExtractionMethod>) -> Self {
        match method {
            None => Self::Unknown,
            Some(ExtractionMethod::Direct) => Self::Pdf,
            Some(ExtractionMethod::ImageOcr) => Self::Image,
            Some(ExtractionMethod::PdfOcrFallback) => Self::ImagePdf,
        }
    }
}

/// Score of one scanned submission file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub file_name: String,
    pub submission_key: String,
    pub score: usize,
    pub missing_questions: Vec<String>,
    pub source_type: SourceType,
    pub method: Option<ExtractionMethod>,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(file_name: impl Into<String>, score: Score, method: Option<ExtractionMethod>) -> Self {
        let file_name = file_name.into();
        Self {
            submission_key: submission_key(&file_name).to_string(),
            file_name,
            score: score.completed,
            missing_questions: score.missing,
            source_type: method.into(),
            method,
        }
    }

    /// Record for a file that was not graded (unsupported, unreadable, or
    /// no OCR available for it).
    #[must_use]
    pub fn ungraded(file_name: impl Into<String>) -> Self {
        Self::new(file_name, Score::zero(), None)
    }

    /// Key used to join against the roster.
    #[must_use]
    pub fn join_key(&self) -> String {
        self.submission_key.to_lowercase()
    }
}

/// Everything before the first underscore of a file name.
#[must_use]
pub fn submission_key(file_name: &str) -> &str {
    file_name
        .split_once('_')
        .map_or(file_name, |(key, _)| key)
}
