use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::binarize::Binarizer;
use super::external::ExternalError;
use super::ocr::{ImageOcr, PdfOcr, PdfOcrStatus};
use super::pdf::PdfTextSource;
use crate::score::{Score, ScoreEvaluator};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("External tool error: {0}")]
    External(#[from] ExternalError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type ExtractResult<T> = Result<T, ExtractionError>;

/// How the text of a submission was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMethod {
    Direct,
    ImageOcr,
    PdfOcrFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    #[must_use]
    pub const fn new(text: String, method: ExtractionMethod) -> Self {
        Self { text, method }
    }
}

/// Optional OCR features the extractor may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub image_ocr: bool,
    pub pdf_ocr: bool,
}

impl Capabilities {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            image_ocr: true,
            pdf_ocr: true,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            image_ocr: false,
            pdf_ocr: false,
        }
    }

    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self {
            image_ocr: self.image_ocr && other.image_ocr,
            pdf_ocr: self.pdf_ocr && other.pdf_ocr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedExtension(Option<String>),
    ImageOcrUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension(Some(ext)) => write!(f, "unsupported extension .{ext}"),
            Self::UnsupportedExtension(None) => f.write_str("no file extension"),
            Self::ImageOcrUnavailable => f.write_str("image OCR is not available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Graded {
        extraction: ExtractionResult,
        score: Score,
    },
    Skipped(SkipReason),
}

/// Gets text out of a submission with the cheapest method that works.
///
/// PDFs are read through their text layer first. When that text matches no
/// question at all and PDF OCR is available, the document is OCR'd into a
/// scratch copy and scored again; the second score is final. A zero caused
/// by a genuinely empty submission cannot be told apart from a scan without
/// a text layer, so the OCR pass runs in both cases.
pub struct TextExtractor {
    capabilities: Capabilities,
    pdf_text: Box<dyn PdfTextSource>,
    image_ocr: Option<Box<dyn ImageOcr>>,
    pdf_ocr: Option<Box<dyn PdfOcr>>,
    binarizer: Option<Binarizer>,
}

impl TextExtractor {
    #[must_use]
    pub fn new(pdf_text: Box<dyn PdfTextSource>, capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            pdf_text,
            image_ocr: None,
            pdf_ocr: None,
            binarizer: Some(Binarizer::default()),
        }
    }

    #[must_use]
    pub fn with_image_ocr(mut self, engine: Box<dyn ImageOcr>) -> Self {
        self.image_ocr = Some(engine);
        self
    }

    #[must_use]
    pub fn with_pdf_ocr(mut self, engine: Box<dyn PdfOcr>) -> Self {
        self.pdf_ocr = Some(engine);
        self
    }

    #[must_use]
    pub const fn with_binarizer(mut self, binarizer: Option<Binarizer>) -> Self {
        self.binarizer = binarizer;
        self
    }

    /// Capabilities that are both enabled and backed by an engine.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            image_ocr: self.image_engine().is_some(),
            pdf_ocr: self.pdf_ocr_engine().is_some(),
        }
    }

    fn image_engine(&self) -> Option<&dyn ImageOcr> {
        self.image_ocr
            .as_deref()
            .filter(|_| self.capabilities.image_ocr)
    }

    fn pdf_ocr_engine(&self) -> Option<&dyn PdfOcr> {
        self.pdf_ocr.as_deref().filter(|_| self.capabilities.pdf_ocr)
    }

    pub async fn extract(
        &self,
        path: &Path,
        evaluator: &ScoreEvaluator,
    ) -> ExtractResult<ExtractionOutcome> {
        let Some(kind) = DocumentKind::from_path(path) else {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string());
            return Ok(ExtractionOutcome::Skipped(SkipReason::UnsupportedExtension(ext)));
        };

        match kind {
            DocumentKind::Image => {
                let Some(engine) = self.image_engine() else {
                    return Ok(ExtractionOutcome::Skipped(SkipReason::ImageOcrUnavailable));
                };
                let extraction = self.extract_image(path, engine).await?;
                let score = evaluator.evaluate(&extraction.text);
                Ok(ExtractionOutcome::Graded { extraction, score })
            }
            DocumentKind::Pdf => {
                let (extraction, score) = self.extract_pdf(path, evaluator).await?;
                Ok(ExtractionOutcome::Graded { extraction, score })
            }
        }
    }

    async fn extract_image(
        &self,
        path: &Path,
        engine: &dyn ImageOcr,
    ) -> ExtractResult<ExtractionResult> {
        let scratch = match self.binarizer {
            Some(binarizer) => {
                let dir = tempfile::Builder::new().prefix("grader-bw-").tempdir()?;
                let input = path.to_path_buf();
                let output = dir.path().join("page.png");
                let target = output.clone();
                tokio::task::spawn_blocking(move || binarizer.binarize(&input, &output)).await??;
                Some((dir, target))
            }
            None => None,
        };

        let target = scratch.as_ref().map_or(path, |(_, p)| p.as_path());
        let text = engine.recognize(target).await?;
        Ok(ExtractionResult::new(text, ExtractionMethod::ImageOcr))
    }

    async fn extract_pdf(
        &self,
        path: &Path,
        evaluator: &ScoreEvaluator,
    ) -> ExtractResult<(ExtractionResult, Score)> {
        let text = self.pdf_text.extract_text(path).await?;
        let score = evaluator.evaluate(&text);
        let direct = ExtractionResult::new(text, ExtractionMethod::Direct);

        if !score.is_zero() {
            return Ok((direct, score));
        }
        let Some(engine) = self.pdf_ocr_engine() else {
            return Ok((direct, score));
        };

        tracing::info!(file = %path.display(), "No questions found in text layer, applying OCR");
        match self.ocr_fallback(path, engine, evaluator).await {
            Ok(Some(rescanned)) => Ok(rescanned),
            Ok(None) => Ok((direct, score)),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "OCR fallback failed, keeping text layer result");
                Ok((direct, score))
            }
        }
    }

    async fn ocr_fallback(
        &self,
        path: &Path,
        engine: &dyn PdfOcr,
        evaluator: &ScoreEvaluator,
    ) -> ExtractResult<Option<(ExtractionResult, Score)>> {
        let dir = tempfile::Builder::new().prefix("grader-ocr-").tempdir()?;
        let output = dir.path().join("ocr.pdf");

        match engine.ocr(path, &output).await? {
            PdfOcrStatus::PriorOcrFound => {
                tracing::info!(file = %path.display(), "OCR skipped because text was already present");
                Ok(None)
            }
            PdfOcrStatus::Completed => {
                let text = self.pdf_text.extract_text(&output).await?;
                let score = evaluator.evaluate(&text);
                Ok(Some((
                    ExtractionResult::new(text, ExtractionMethod::PdfOcrFallback),
                    score,
                )))
            }
        }
    }
}
