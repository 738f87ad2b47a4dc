//! Domain error types
//!
//! This module defines the error hierarchy for Meridian. All errors are
//! domain-specific and don't expose third-party HTTP client types. The three
//! failure categories the submission workflow reports (validation,
//! identity-resolution, processing) map onto these variants through
//! [`crate::domain::outcome::FailureCategory`].

use thiserror::Error;

/// Main Meridian error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed or incomplete inbound report, unresolved registry code
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record-linkage (CRID) errors
    #[error("Identity resolution error: {0}")]
    Linkage(#[from] LinkageError),

    /// Registry-side errors (existence checks, creates, batch submission)
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Record-linkage service errors
///
/// Errors from the CRID endpoint. The workflow only accepts a single perfect
/// match; every other outcome is fatal to the invocation.
#[derive(Debug, Error)]
pub enum LinkageError {
    /// Failed to reach the linkage endpoint
    #[error("Failed to connect to linkage service: {0}")]
    ConnectionFailed(String),

    /// The service returned no perfect match for the patient attributes
    #[error("No perfect match for patient")]
    NoPerfectMatch,

    /// The service returned more than one perfect match
    #[error("Ambiguous match: {count} perfect matches returned")]
    AmbiguousMatch { count: usize },

    /// Malformed response body
    #[error("Invalid response from linkage service: {0}")]
    InvalidResponse(String),

    /// Non-success HTTP status
    #[error("Linkage request failed: {status} - {message}")]
    RequestFailed { status: u16, message: String },
}

/// Registry errors
///
/// Errors that occur when interacting with the registry's FHIR surface.
/// A search that *executes* and returns zero results is not an error; only a
/// search that fails to execute lands here, so that transient faults never
/// masquerade as "does not exist".
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to reach the registry
    #[error("Failed to connect to registry: {0}")]
    ConnectionFailed(String),

    /// A search query failed to execute
    #[error("Search failed: {status} - {message}")]
    SearchFailed { status: u16, message: String },

    /// Patient create was rejected
    #[error("Patient create rejected: {status} - {message}")]
    CreateRejected { status: u16, message: String },

    /// Patient create succeeded but returned no usable Location header
    #[error("Patient create returned no Location header with a patient id")]
    MissingLocation,

    /// Transaction bundle submission failed
    #[error("Bundle submission failed: {status} - {message}")]
    SubmitFailed { status: u16, message: String },

    /// Malformed response body
    #[error("Invalid response from registry: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for MeridianError {
    fn from(err: std::io::Error) -> Self {
        MeridianError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MeridianError {
    fn from(err: serde_json::Error) -> Self {
        MeridianError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MeridianError {
    fn from(err: toml::de::Error) -> Self {
        MeridianError::Configuration(format!("TOML parse error: {err}"))
    }
}
