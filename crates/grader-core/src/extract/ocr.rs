use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::external::ExternalTool;
use super::extractor::ExtractResult;

/// Recognizes text in a single image file.
#[async_trait::async_trait]
pub trait ImageOcr: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, image: &Path) -> ExtractResult<String>;
}

/// How a whole-document OCR pass ended, when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfOcrStatus {
    /// `output` now holds a PDF with a recognized text layer.
    Completed,
    /// The input already carries a text layer; nothing was written.
    PriorOcrFound,
}

/// Produces a copy of a PDF with an OCR text layer.
#[async_trait::async_trait]
pub trait PdfOcr: Send + Sync {
    fn name(&self) -> &str;

    async fn ocr(&self, input: &Path, output: &Path) -> ExtractResult<PdfOcrStatus>;
}

pub struct Tesseract {
    tool: ExternalTool,
    language: Option<String>,
}

impl Tesseract {
    pub const BINARY: &'static str = "tesseract";

    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            tool: ExternalTool::new(Self::BINARY, program),
            language: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn args(&self, image: &Path) -> Vec<OsString> {
        let mut args = vec![image.as_os_str().to_os_string(), OsString::from("stdout")];
        if let Some(lang) = &self.language {
            args.push(OsString::from("-l"));
            args.push(OsString::from(lang));
        }
        args
    }
}

#[async_trait::async_trait]
impl ImageOcr for Tesseract {
    fn name(&self) -> &str {
        self.tool.name()
    }

    async fn recognize(&self, image: &Path) -> ExtractResult<String> {
        let output = self.tool.run_checked(self.args(image)).await?;
        Ok(output.stdout)
    }
}

pub struct OcrMyPdf {
    tool: ExternalTool,
    language: Option<String>,
}

impl OcrMyPdf {
    pub const BINARY: &'static str = "ocrmypdf";

    /// Exit status ocrmypdf uses when the input already has text.
    pub const PRIOR_OCR_EXIT_CODE: i32 = 6;

    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            tool: ExternalTool::new(Self::BINARY, program),
            language: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(lang) = &self.language {
            args.push(OsString::from("-l"));
            args.push(OsString::from(lang));
        }
        args.push(input.as_os_str().to_os_string());
        args.push(output.as_os_str().to_os_string());
        args
    }
}

#[async_trait::async_trait]
impl PdfOcr for OcrMyPdf {
    fn name(&self) -> &str {
        self.tool.name()
    }

    async fn ocr(&self, input: &Path, output: &Path) -> ExtractResult<PdfOcrStatus> {
        let result = self.tool.run(self.args(input, output)).await?;

        if result.success() {
            Ok(PdfOcrStatus::Completed)
        } else if result.code() == Some(Self::PRIOR_OCR_EXIT_CODE) {
            Ok(PdfOcrStatus::PriorOcrFound)
        } else {
            Err(result.into_failure(self.tool.name()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tesseract_args() {
        let engine = Tesseract::new("tesseract").with_language(Some("eng".into()));

        let args = engine.args(Path::new("scan.png"));

        assert_eq!(args, os_args(&["scan.png", "stdout", "-l", "eng"]));
    }

    #[test]
    fn test_ocrmypdf_args_without_language() {
        let engine = OcrMyPdf::new("ocrmypdf");

        let args = engine.args(Path::new("in.pdf"), Path::new("out.pdf"));

        assert_eq!(args, os_args(&["in.pdf", "out.pdf"]));
    }

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ocrmypdf_prior_ocr_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ocrmypdf");
        write_script(&script, "#!/bin/sh\necho 'page already has text' >&2\nexit 6\n");

        let status = OcrMyPdf::new(&script)
            .ocr(Path::new("in.pdf"), &dir.path().join("out.pdf"))
            .await
            .unwrap();

        assert_eq!(status, PdfOcrStatus::PriorOcrFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ocrmypdf_other_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ocrmypdf");
        write_script(&script, "#!/bin/sh\nexit 2\n");

        let result = OcrMyPdf::new(&script)
            .ocr(Path::new("in.pdf"), &dir.path().join("out.pdf"))
            .await;

        assert!(result.is_err());
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        std::fs::write(path, body).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
