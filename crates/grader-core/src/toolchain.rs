use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{OcrConfig, ToolConfig};
use crate::extract::{Capabilities, OcrMyPdf, Pdftotext, Tesseract, TextExtractor};

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("pdftotext not found ({searched}); install poppler-utils or pass --pdftotext")]
    MissingPdfExtractor { searched: String },
}

pub type ToolchainResult<T> = Result<T, ToolchainError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Pdftotext,
    Tesseract,
    OcrMyPdf,
}

impl Tool {
    pub const fn binary_name(&self) -> &'static str {
        match self {
            Self::Pdftotext => Pdftotext::BINARY,
            Self::Tesseract => Tesseract::BINARY,
            Self::OcrMyPdf => OcrMyPdf::BINARY,
        }
    }

    /// What the run loses when this tool is absent.
    pub const fn feature(&self) -> &'static str {
        match self {
            Self::Pdftotext => "PDF text extraction",
            Self::Tesseract => "image OCR",
            Self::OcrMyPdf => "PDF OCR fallback",
        }
    }

    /// Install locations that are not normally on PATH.
    fn fallback_locations(self) -> Vec<PathBuf> {
        match self {
            Self::Tesseract if cfg!(windows) => dirs::data_local_dir()
                .map(|dir| dir.join("Tesseract-OCR").join("tesseract.exe"))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Find a tool. An explicit location is authoritative: when it does not
/// resolve, PATH is not searched.
pub fn locate(tool: Tool, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return which::which(path).ok();
    }

    which::which(tool.binary_name()).ok().or_else(|| {
        tool.fallback_locations()
            .into_iter()
            .find(|candidate| candidate.is_file())
    })
}

/// The external binaries available to this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub pdftotext: PathBuf,
    pub tesseract: Option<PathBuf>,
    pub ocrmypdf: Option<PathBuf>,
}

impl Toolchain {
    pub fn discover(config: &ToolConfig) -> ToolchainResult<Self> {
        let pdftotext = locate(Tool::Pdftotext, config.pdftotext.as_deref())
            .ok_or_else(|| ToolchainError::MissingPdfExtractor {
                searched: config
                    .pdftotext
                    .as_ref()
                    .map_or_else(|| "PATH".to_string(), |p| p.display().to_string()),
            })?;
        let tesseract = locate(Tool::Tesseract, config.tesseract.as_deref());
        let ocrmypdf = locate(Tool::OcrMyPdf, config.ocrmypdf.as_deref());

        tracing::debug!(
            pdftotext = %pdftotext.display(),
            tesseract = ?tesseract,
            ocrmypdf = ?ocrmypdf,
            "Discovered toolchain"
        );

        Ok(Self {
            pdftotext,
            tesseract,
            ocrmypdf,
        })
    }

    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            image_ocr: self.tesseract.is_some(),
            pdf_ocr: self.ocrmypdf.is_some(),
        }
    }

    pub fn missing(&self) -> Vec<Tool> {
        let mut missing = Vec::new();
        if self.tesseract.is_none() {
            missing.push(Tool::Tesseract);
        }
        if self.ocrmypdf.is_none() {
            missing.push(Tool::OcrMyPdf);
        }
        missing
    }

    /// Build an extractor limited to what is installed and what `ocr` allows.
    /// Each missing optional tool is reported once here.
    pub fn extractor(&self, ocr: &OcrConfig) -> TextExtractor {
        if ocr.enabled {
            for tool in self.missing() {
                tracing::warn!(tool = %tool, "{} not found, {} disabled", tool, tool.feature());
            }
        } else {
            tracing::info!("OCR disabled by configuration");
        }

        let capabilities = self.capabilities().intersect(ocr.allowed());
        let mut extractor = TextExtractor::new(Box::new(Pdftotext::new(&self.pdftotext)), capabilities)
            .with_binarizer(ocr.binarizer());

        if let Some(path) = &self.tesseract {
            extractor = extractor
                .with_image_ocr(Box::new(Tesseract::new(path).with_language(ocr.language.clone())));
        }
        if let Some(path) = &self.ocrmypdf {
            extractor = extractor
                .with_pdf_ocr(Box::new(OcrMyPdf::new(path).with_language(ocr.language.clone())));
        }
        extractor
    }
}
