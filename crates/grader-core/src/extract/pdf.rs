use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::external::ExternalTool;
use super::extractor::ExtractResult;

/// Reads the native text layer of a PDF.
#[async_trait::async_trait]
pub trait PdfTextSource: Send + Sync {
    fn name(&self) -> &str;

    async fn extract_text(&self, path: &Path) -> ExtractResult<String>;
}

/// Poppler's `pdftotext`, writing UTF-8 text to stdout.
pub struct Pdftotext {
    tool: ExternalTool,
}

impl Pdftotext {
    pub const BINARY: &'static str = "pdftotext";

    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            tool: ExternalTool::new(Self::BINARY, program),
        }
    }
}

#[async_trait::async_trait]
impl PdfTextSource for Pdftotext {
    fn name(&self) -> &str {
        self.tool.name()
    }

    async fn extract_text(&self, path: &Path) -> ExtractResult<String> {
        let args = [
            OsStr::new("-enc"),
            OsStr::new("UTF-8"),
            path.as_os_str(),
            OsStr::new("-"),
        ];
        let output = self.tool.run_checked(args).await?;
        Ok(output.stdout)
    }
}
