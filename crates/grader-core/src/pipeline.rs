use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::extract::{ExtractionError, ExtractionOutcome, SkipReason, TextExtractor};
use crate::record::{ScoreRecord, SourceType};
use crate::score::ScoreEvaluator;
use crate::source::{SourceError, SubmissionSource};

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub type GradeResult<T> = Result<T, GradeError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeStats {
    pub files_scanned: usize,
    pub pdf: usize,
    pub image: usize,
    pub image_pdf: usize,
    pub unknown: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl GradeStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every PDF that ended up graded from its OCR'd copy.
    pub const fn ocr_fallbacks(&self) -> usize {
        self.image_pdf
    }

    fn count(&mut self, source_type: SourceType) {
        self.files_scanned += 1;
        match source_type {
            SourceType::Pdf => self.pdf += 1,
            SourceType::Image => self.image += 1,
            SourceType::ImagePdf => self.image_pdf += 1,
            SourceType::Unknown => self.unknown += 1,
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            files = self.files_scanned,
            pdf = self.pdf,
            image = self.image,
            image_pdf = self.image_pdf,
            unknown = self.unknown,
            ocr_fallbacks = self.ocr_fallbacks(),
            skipped = self.skipped,
            failed = self.failed,
            duration_ms = self.duration_ms,
            "Grading complete"
        );
    }
}

/// One scanned file. `skipped` is set when the file was never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedFile {
    pub record: ScoreRecord,
    pub skipped: Option<SkipReason>,
}

#[derive(Debug, Default)]
pub struct BatchGradeResult {
    /// One row per scanned file, in scan order, failures included.
    pub records: Vec<ScoreRecord>,
    pub failures: Vec<(PathBuf, GradeError)>,
    pub stats: GradeStats,
}

impl BatchGradeResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_graded(&mut self, graded: GradedFile) {
        self.stats.count(graded.record.source_type);
        if graded.skipped.is_some() {
            self.stats.skipped += 1;
        }
        self.records.push(graded.record);
    }

    fn add_failure(&mut self, path: PathBuf, error: GradeError) {
        let record = ScoreRecord::ungraded(file_name(&path));
        self.stats.count(record.source_type);
        self.stats.failed += 1;
        self.records.push(record);
        self.failures.push((path, error));
    }

    pub fn success_count(&self) -> usize {
        self.records.len() - self.failures.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Scans submissions one at a time and scores each against the question set.
pub struct GradingPipeline {
    extractor: TextExtractor,
    evaluator: ScoreEvaluator,
}

impl GradingPipeline {
    #[must_use]
    pub const fn new(extractor: TextExtractor, evaluator: ScoreEvaluator) -> Self {
        Self {
            extractor,
            evaluator,
        }
    }

    pub const fn evaluator(&self) -> &ScoreEvaluator {
        &self.evaluator
    }

    pub async fn grade_file(&self, path: &Path) -> GradeResult<GradedFile> {
        let name = file_name(path);

        match self.extractor.extract(path, &self.evaluator).await? {
            ExtractionOutcome::Graded { extraction, score } => {
                let record = ScoreRecord::new(name, score, Some(extraction.method));
                tracing::info!(
                    file = %record.file_name,
                    student = %record.submission_key,
                    score = record.score,
                    method = ?extraction.method,
                    "Graded submission"
                );
                Ok(GradedFile {
                    record,
                    skipped: None,
                })
            }
            ExtractionOutcome::Skipped(reason) => {
                tracing::warn!(file = %name, reason = %reason, "Skipping submission");
                Ok(GradedFile {
                    record: ScoreRecord::ungraded(name),
                    skipped: Some(reason),
                })
            }
        }
    }

    /// Grade files in the given order. Per-file errors are recorded as
    /// ungraded rows and never stop the batch.
    pub async fn grade_files(&self, paths: &[PathBuf]) -> BatchGradeResult {
        let start = std::time::Instant::now();
        let mut result = BatchGradeResult::new();

        for path in paths {
            match self.grade_file(path).await {
                Ok(graded) => result.add_graded(graded),
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Failed to grade submission");
                    result.add_failure(path.clone(), e);
                }
            }
        }

        result.stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        result
    }

    pub async fn grade_source(&self, source: &SubmissionSource) -> GradeResult<BatchGradeResult> {
        let files = source.list_files().await?;
        tracing::info!(dir = %source.root().display(), files = files.len(), "Scanning submissions");
        Ok(self.grade_files(&files).await)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
        .to_string()
}
