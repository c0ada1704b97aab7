use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::{Binarizer, Capabilities};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const ENV_PDFTOTEXT: &str = "GRADER_PDFTOTEXT";
pub const ENV_TESSERACT: &str = "GRADER_TESSERACT";
pub const ENV_OCRMYPDF: &str = "GRADER_OCRMYPDF";
pub const ENV_OCR_LANGUAGE: &str = "GRADER_OCR_LANGUAGE";
pub const ENV_DISABLE_OCR: &str = "GRADER_DISABLE_OCR";

/// Explicit tool locations. `None` means "search PATH".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub pdftotext: Option<PathBuf>,
    pub tesseract: Option<PathBuf>,
    pub ocrmypdf: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Master switch for both image OCR and the PDF OCR fallback
    pub enabled: bool,
    /// Binarize images before handing them to the OCR engine
    pub binarize: bool,
    /// Luminance threshold for binarization
    pub threshold: u8,
    /// Language passed to tesseract and ocrmypdf (`-l`)
    pub language: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binarize: true,
            threshold: Binarizer::DEFAULT_THRESHOLD,
            language: None,
        }
    }
}

impl OcrConfig {
    /// Capabilities the user allows, before checking what is installed.
    #[must_use]
    pub const fn allowed(&self) -> Capabilities {
        if self.enabled {
            Capabilities::all()
        } else {
            Capabilities::none()
        }
    }

    #[must_use]
    pub const fn binarizer(&self) -> Option<Binarizer> {
        if self.binarize {
            Some(Binarizer::new(self.threshold))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub tools: ToolConfig,
    pub ocr: OcrConfig,
}

impl GraderConfig {
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Overlay `GRADER_*` environment variables.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty(ENV_PDFTOTEXT) {
            self.tools.pdftotext = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty(ENV_TESSERACT) {
            self.tools.tesseract = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty(ENV_OCRMYPDF) {
            self.tools.ocrmypdf = Some(PathBuf::from(path));
        }
        if let Some(lang) = non_empty(ENV_OCR_LANGUAGE) {
            self.ocr.language = Some(lang);
        }
        if let Some(flag) = non_empty(ENV_DISABLE_OCR) {
            if parse_flag(&flag) {
                self.ocr.enabled = false;
            }
        }
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GraderConfig::default();

        assert!(config.ocr.enabled);
        assert!(config.ocr.binarize);
        assert_eq!(config.ocr.threshold, 128);
        assert_eq!(config.tools, ToolConfig::default());
        assert_eq!(config.ocr.allowed(), Capabilities::all());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            GraderConfig::from_json(r#"{"ocr": {"language": "deu"}, "tools": {"tesseract": "/opt/tess"}}"#)
                .unwrap();

        assert_eq!(config.ocr.language.as_deref(), Some("deu"));
        assert!(config.ocr.enabled);
        assert_eq!(config.tools.tesseract, Some(PathBuf::from("/opt/tess")));
        assert_eq!(config.tools.pdftotext, None);
    }

    #[test]
    fn test_env_overrides_file() {
        let config = GraderConfig::from_json(r#"{"ocr": {"language": "deu"}}"#)
            .unwrap()
            .with_env_from(env(&[
                (ENV_OCR_LANGUAGE, "fra"),
                (ENV_PDFTOTEXT, "/usr/local/bin/pdftotext"),
                (ENV_DISABLE_OCR, "true"),
            ]));

        assert_eq!(config.ocr.language.as_deref(), Some("fra"));
        assert_eq!(
            config.tools.pdftotext,
            Some(PathBuf::from("/usr/local/bin/pdftotext"))
        );
        assert_eq!(config.ocr.allowed(), Capabilities::none());
    }

    #[test]
    fn test_env_ignores_empty_and_false_values() {
        let config = GraderConfig::default()
            .with_env_from(env(&[(ENV_TESSERACT, "  "), (ENV_DISABLE_OCR, "0")]));

        assert_eq!(config.tools.tesseract, None);
        assert!(config.ocr.enabled);
    }

    #[test]
    fn test_binarizer_follows_config() {
        let mut ocr = OcrConfig {
            threshold: 90,
            ..OcrConfig::default()
        };
        assert_eq!(ocr.binarizer(), Some(Binarizer::new(90)));

        ocr.binarize = false;
        assert_eq!(ocr.binarizer(), None);
    }

    #[tokio::test]
    async fn test_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grader.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = GraderConfig::load(&path).await;

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_load_reports_missing_file() {
        let result = GraderConfig::load(Path::new("/nonexistent/grader.json")).await;

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
