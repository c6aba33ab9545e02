use std::fmt;

use partner_recon::ReconError;

/// Failures of the job glue around the engine.
#[derive(Debug)]
pub enum PipelineError {
    /// Trigger event missing, unreadable, or without a bucket.
    Event(String),
    /// Object store read/list failure.
    Storage(String),
    /// Queue send failure.
    Queue(String),
    /// Table write failure.
    Table(String),
    /// Config or input-file error from the engine crate.
    Recon(ReconError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(msg) => write!(f, "trigger event: {msg}"),
            Self::Storage(msg) => write!(f, "object store: {msg}"),
            Self::Queue(msg) => write!(f, "queue: {msg}"),
            Self::Table(msg) => write!(f, "table: {msg}"),
            Self::Recon(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Recon(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReconError> for PipelineError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}
