use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Toolchain(#[from] crate::toolchain::ToolchainError),

    #[error(transparent)]
    Question(#[from] crate::question::QuestionError),

    #[error(transparent)]
    Roster(#[from] crate::roster::RosterError),

    #[error(transparent)]
    Source(#[from] crate::source::SourceError),

    #[error(transparent)]
    Grade(#[from] crate::pipeline::GradeError),

    #[error(transparent)]
    Extraction(#[from] crate::extract::ExtractionError),

    #[error(transparent)]
    Report(#[from] crate::report::ReportError),
}

pub type Result<T> = std::result::Result<T, Error>;
