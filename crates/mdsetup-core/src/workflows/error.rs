use crate::analysis::error::AnalysisError;
use crate::core::io::pdb::PdbError;
use crate::core::io::results::ResultsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to save results: {0}")]
    Results(#[from] ResultsError),

    #[error("Failed to write structure '{path}': {source}")]
    Structure { path: PathBuf, source: PdbError },

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to render template '{name}': {source}")]
    Template {
        name: String,
        source: minijinja::Error,
    },

    #[error("Fluctuation table has {rows} rows but the structure has {atoms} atoms")]
    AnnotationMismatch { rows: usize, atoms: usize },
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
