#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::option_if_let_else)]

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod question;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod roster;
pub mod score;
pub mod shorthand;
pub mod source;
pub mod toolchain;

pub use config::{ConfigError, GraderConfig, OcrConfig, ToolConfig};
pub use error::{Error, Result};
pub use extract::{
    Binarizer, Capabilities, ExtractionError, ExtractionMethod, ExtractionOutcome,
    ExtractionResult, ImageOcr, OcrMyPdf, PdfOcr, PdfOcrStatus, PdfTextSource, Pdftotext,
    SkipReason, Tesseract, TextExtractor,
};
pub use pipeline::{BatchGradeResult, GradeError, GradeStats, GradedFile, GradingPipeline};
pub use question::{QuestionError, QuestionSet};
pub use reconcile::{NameHint, NameReconciler, PairedRecord, SimilarityHint};
pub use record::{ScoreRecord, SourceType};
pub use roster::{Roster, RosterEntry, RosterError};
pub use score::{Score, ScoreEvaluator};
pub use shorthand::{Section, ShorthandError};
pub use source::{SourceError, SubmissionSource};
pub use toolchain::{Tool, Toolchain, ToolchainError};
