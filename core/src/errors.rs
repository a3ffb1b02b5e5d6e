use std::fmt;
use std::path::PathBuf;

/// Result type used by engines and helpers. Engines report their own
/// diagnostics through `anyhow`, the pipeline then files them under a
/// [`ProbeError`] kind.
pub type ProbeResult<T> = anyhow::Result<T>;

/// Session lifecycle step that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStage {
    Create,
    Run,
    Close,
    Delete,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SessionStage::Create => "create",
            SessionStage::Run => "run",
            SessionStage::Close => "close",
            SessionStage::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// Every way a probe run can stop. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to {step} model file {path:?}: {source}")]
    Io {
        path: PathBuf,
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file {0:?} is empty")]
    EmptyModel(PathBuf),

    #[error("Graph import failed: {0}")]
    Import(String),

    #[error("Operation {0:?} not found in graph")]
    MissingOperation(String),

    #[error("Can not resolve shape: {0}")]
    Shape(String),

    #[error("Can not build tensor: {0}")]
    TensorConstruction(String),

    #[error("Session {stage} failed: {message}")]
    Session { stage: SessionStage, message: String },

    #[error("No usable result: {0}")]
    NullResult(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl ProbeError {
    pub(crate) fn import(e: anyhow::Error) -> ProbeError {
        ProbeError::Import(format!("{e:#}"))
    }

    pub(crate) fn session(stage: SessionStage, e: anyhow::Error) -> ProbeError {
        ProbeError::Session { stage, message: format!("{e:#}") }
    }

    /// The session stage this error comes from, if any.
    pub fn session_stage(&self) -> Option<SessionStage> {
        match self {
            ProbeError::Session { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
