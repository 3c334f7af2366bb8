//! Error types for the fareclaim-core library.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for the fareclaim library.
#[derive(Error, Debug)]
pub enum FareclaimError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Form agent (browser automation) error.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Claim submission error.
    #[error("claim error: {0}")]
    Claim(#[from] ClaimError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading text out of a receipt document.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file could not be read from disk.
    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors reported by a [`FormAgent`](crate::agent::FormAgent).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A wait did not reach its condition in time.
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    /// An element could not be located.
    #[error("element not found: {0}")]
    NotFound(String),

    /// The automation session could not be created or was lost.
    #[error("session error: {0}")]
    Session(String),

    /// The driver answered with an error or an unexpected payload.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The driver could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Stage of the processing keyword cycle that failed to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordStage {
    /// The keyword never showed up.
    Appear,
    /// The keyword showed up but never went away.
    Disappear,
}

impl std::fmt::Display for KeywordStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeywordStage::Appear => write!(f, "appear"),
            KeywordStage::Disappear => write!(f, "disappear"),
        }
    }
}

/// Errors that abort a single claim attempt.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// An expected portal control could not be located.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// The portal did not reach an expected state in time.
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    /// The upload processing indicator did not complete its cycle.
    #[error("processing keyword '{keyword}' did not {stage} within {after:?}")]
    ProcessingTimeout {
        keyword: String,
        stage: KeywordStage,
        after: Duration,
    },

    /// The receipt has no amount that could be claimed.
    #[error("receipt {0} has no resolved amount")]
    UnclaimableAmount(PathBuf),

    /// Any other agent failure.
    #[error(transparent)]
    Agent(AgentError),

    /// The attempt tried to move to a phase it cannot reach.
    #[error(transparent)]
    Transition(#[from] crate::claim::IllegalTransition),

    /// The source file could not be removed after a confirmed claim.
    #[error("failed to delete {path}: {source}")]
    Deletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<AgentError> for ClaimError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Timeout { what, after } => ClaimError::Timeout { what, after },
            AgentError::NotFound(what) => ClaimError::FieldNotFound(what),
            other => ClaimError::Agent(other),
        }
    }
}

/// Result type for the fareclaim library.
pub type Result<T> = std::result::Result<T, FareclaimError>;
