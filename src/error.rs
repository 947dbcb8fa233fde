//! Error types for the redaction pipeline.

use thiserror::Error;

/// Result type alias for pdfredact operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message handed to end users when any core error reaches the boundary.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process PDF";

/// Error types that can occur while redacting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The input bytes are not a loadable PDF document.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A page's content could not be decoded into positioned text.
    #[error("Extraction failed on page {page}: {reason}")]
    Extraction {
        /// 1-based page number
        page: u32,
        /// What went wrong
        reason: String,
    },

    /// A match references a page the document does not have.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A match's geometry lies outside its page.
    #[error("Geometry out of bounds on page {page}: {rect}")]
    GeometryOutOfBounds {
        /// 1-based page number
        page: u32,
        /// Offending rectangle, formatted for diagnostics
        rect: String,
    },

    /// Writing the redacted document failed.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A rule pattern failed to compile.
    #[error("Invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        /// Rule name
        rule: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// Malformed stamp, rule file, or options.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse classification of [`Error`], stable for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unparsable or unsupported input bytes
    InvalidInput,
    /// A page's layout could not be decoded
    ExtractionFailure,
    /// Out-of-bounds geometry or re-serialization failure
    RenderFailure,
    /// Malformed rule pattern, stamp, or options
    ConfigurationError,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) | Error::Encrypted => ErrorKind::InvalidInput,
            Error::Extraction { .. } => ErrorKind::ExtractionFailure,
            Error::PageOutOfRange(..) | Error::GeometryOutOfBounds { .. } | Error::Serialize(_) => {
                ErrorKind::RenderFailure
            }
            Error::InvalidPattern { .. } | Error::Configuration(_) => {
                ErrorKind::ConfigurationError
            }
        }
    }

    /// User-facing message that leaks no internal detail.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }

    pub(crate) fn extraction(page: u32, reason: impl ToString) -> Self {
        Error::Extraction {
            page,
            reason: reason.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::InvalidInput(err.to_string()),
        }
    }
}
