use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use grader_core::GraderConfig;

#[derive(Debug, Parser)]
#[command(
    name = "grader",
    about = "Score practice assignment submissions against a question list",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub grade: GradeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Expand a shorthand listing ("sc 1.1, 1.2 ex 3.4") into question lines
    Questions {
        /// File holding the shorthand listing
        listing: PathBuf,
        /// Question list to append to
        #[arg(short, long, default_value = "questions.txt")]
        output: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct GradeArgs {
    /// Directory or .zip archive of submissions named <student>_<anything>.<ext>
    pub submissions: PathBuf,

    /// Question list, one identifier per line
    #[arg(long, default_value = "questions.txt")]
    pub questions: PathBuf,

    /// Class roster, one "Surname, Given" per line
    #[arg(long, default_value = "names.txt")]
    pub names: PathBuf,

    /// Scores table
    #[arg(short, long, default_value = "scores.csv")]
    pub output: PathBuf,

    /// Scores paired with the roster (written only when the roster exists)
    #[arg(long, default_value = "paired_scores.csv")]
    pub paired_output: PathBuf,

    /// Never run OCR on images or PDFs
    #[arg(long)]
    pub disable_ocr: bool,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to pdftotext
    #[arg(long)]
    pub pdftotext: Option<PathBuf>,

    /// Path to tesseract
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Path to ocrmypdf
    #[arg(long)]
    pub ocrmypdf: Option<PathBuf>,

    /// OCR language, e.g. eng or deu+eng
    #[arg(long)]
    pub ocr_language: Option<String>,

    /// OCR images as they are, without converting to black and white
    #[arg(long)]
    pub no_binarize: bool,
}

impl GradeArgs {
    /// Command-line flags override everything else.
    pub fn apply(&self, mut config: GraderConfig) -> GraderConfig {
        if let Some(path) = &self.pdftotext {
            config.tools.pdftotext = Some(path.clone());
        }
        if let Some(path) = &self.tesseract {
            config.tools.tesseract = Some(path.clone());
        }
        if let Some(path) = &self.ocrmypdf {
            config.tools.ocrmypdf = Some(path.clone());
        }
        if let Some(lang) = &self.ocr_language {
            config.ocr.language = Some(lang.clone());
        }
        if self.disable_ocr {
            config.ocr.enabled = false;
        }
        if self.no_binarize {
            config.ocr.binarize = false;
        }
        config
    }
}
