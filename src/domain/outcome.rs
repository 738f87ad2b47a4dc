//! Submission outcome and reporting
//!
//! The outcome is the sole observable return value of the workflow: one
//! immutable value describing either success (with an ordered diagnostic
//! trail, one line per completed step) or failure (with a machine-readable
//! category and a diagnostic message). No partial results are exposed
//! through any other channel.

use crate::domain::errors::MeridianError;
use crate::domain::ids::{MatchId, RemotePatientId};

/// Result of a completed submission
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    /// Match identifier resolved for the patient
    pub match_id: MatchId,

    /// Whether the patient record was created by this invocation
    pub patient_created: bool,

    /// The registry's id for the patient record
    pub remote_patient_id: RemotePatientId,

    /// Number of observations included in the submitted batch
    pub observations_submitted: usize,

    /// Ordered diagnostic trail, one message per completed step
    pub trail: Vec<String>,
}

/// Result of a failed submission
#[derive(Debug, Clone)]
pub struct SubmissionFailure {
    /// Machine-readable failure category
    pub category: FailureCategory,

    /// Human-readable diagnostic message
    pub message: String,

    /// Underlying fault detail, when one exists
    pub detail: Option<String>,

    /// Steps that completed before the failure
    pub trail: Vec<String>,
}

/// Machine-readable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Malformed/incomplete inbound report or unresolved registry code;
    /// raised before any network call
    Validation,

    /// No perfect match, ambiguous match, or linkage transport error
    IdentityResolution,

    /// Failure in the existence check, create, or batch-submit steps
    Processing,
}

impl FailureCategory {
    /// Short lowercase label for logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Validation => "validation",
            FailureCategory::IdentityResolution => "identity-resolution",
            FailureCategory::Processing => "processing",
        }
    }
}

impl From<&MeridianError> for FailureCategory {
    fn from(err: &MeridianError) -> Self {
        match err {
            MeridianError::Validation(_) => FailureCategory::Validation,
            MeridianError::Linkage(_) => FailureCategory::IdentityResolution,
            _ => FailureCategory::Processing,
        }
    }
}

/// Terminal outcome of one pipeline invocation
///
/// Created once per invocation and never mutated after return.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Success(SubmissionReceipt),
    Failure(SubmissionFailure),
}

impl SubmissionOutcome {
    /// Build the failure outcome for an error, carrying the trail of steps
    /// that completed before it
    pub fn from_error(err: &MeridianError, trail: Vec<String>) -> Self {
        let detail = std::error::Error::source(err).map(|source| source.to_string());
        SubmissionOutcome::Failure(SubmissionFailure {
            category: FailureCategory::from(err),
            message: err.to_string(),
            detail,
            trail,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success(_))
    }

    /// The diagnostic trail, whichever way the invocation ended
    pub fn trail(&self) -> &[String] {
        match self {
            SubmissionOutcome::Success(receipt) => &receipt.trail,
            SubmissionOutcome::Failure(failure) => &failure.trail,
        }
    }

    /// Log the outcome
    pub fn log_summary(&self) {
        match self {
            SubmissionOutcome::Success(receipt) => {
                tracing::info!(
                    match_id = %receipt.match_id,
                    patient_created = receipt.patient_created,
                    remote_patient_id = %receipt.remote_patient_id,
                    observations_submitted = receipt.observations_submitted,
                    "Submission completed"
                );
            }
            SubmissionOutcome::Failure(failure) => {
                tracing::error!(
                    category = failure.category.as_str(),
                    message = %failure.message,
                    detail = failure.detail.as_deref().unwrap_or(""),
                    "Submission failed"
                );
            }
        }
    }
}
