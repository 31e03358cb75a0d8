//! Error types for publishing.

use std::path::PathBuf;

/// A file that failed signature validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Publishing errors. Unlike the registry client these always abort the run.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Trust list could not be downloaded.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Trust list body is not in the expected format.
    #[error("invalid {source_name} trust list: {message}")]
    TrustList {
        source_name: String,
        message: String,
    },

    /// Certificate could not be inspected.
    #[error("failed to extract certificate information: {message}")]
    Certificate { message: String },

    /// Filesystem error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid JSON.
    #[error("invalid JSON in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    /// Signing key is unusable.
    #[error("invalid signing key: {message}")]
    SigningKey { message: String },

    /// Signing a record failed, including self-verification.
    #[error("failed to sign {}: {message}", path.display())]
    Signing { path: PathBuf, message: String },

    /// One or more records failed validation.
    #[error("{} files have invalid signatures", failures.len())]
    InvalidSignatures { failures: Vec<SignatureFailure> },

    /// Deprecation notice cannot be written.
    #[error("deprecation notice: {message}")]
    Deprecation { message: String },
}

impl PublishError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn trust_list(source_name: &str, message: impl Into<String>) -> Self {
        Self::TrustList {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for publishing operations.
pub type PublishResult<T> = Result<T, PublishError>;
