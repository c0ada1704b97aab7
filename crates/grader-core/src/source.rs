use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Submissions not found: {0}")]
    NotFound(PathBuf),
    #[error("Submissions must be a directory or a .zip archive: {0}")]
    Unsupported(PathBuf),
    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Where submission files are read from. An unpacked archive lives in a
/// scratch directory that is removed when the source is dropped.
#[derive(Debug)]
pub enum SubmissionSource {
    Directory(PathBuf),
    Archive { archive: PathBuf, unpacked: TempDir },
}

impl SubmissionSource {
    pub async fn open(path: &Path) -> SourceResult<Self> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }
        if !is_zip(path) {
            return Err(SourceError::Unsupported(path.to_path_buf()));
        }

        let archive = path.to_path_buf();
        let target = archive.clone();
        let unpacked = tokio::task::spawn_blocking(move || unpack(&target)).await??;
        tracing::info!(
            archive = %archive.display(),
            dir = %unpacked.path().display(),
            "Unpacked submissions archive"
        );
        Ok(Self::Archive { archive, unpacked })
    }

    pub fn root(&self) -> &Path {
        match self {
            Self::Directory(dir) => dir,
            Self::Archive { unpacked, .. } => unpacked.path(),
        }
    }

    /// Regular files directly under the root, sorted by file name.
    pub async fn list_files(&self) -> SourceResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(self.root()).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn unpack(archive: &Path) -> SourceResult<TempDir> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(std::io::BufReader::new(file))?;
    let dir = tempfile::Builder::new().prefix("grader-submissions-").tempdir()?;
    zip.extract(dir.path())?;
    Ok(dir)
}
