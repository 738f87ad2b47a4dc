//! Submission pipeline - main orchestrator for the synchronization workflow
//!
//! One linear, short-circuiting sequence per invocation: validate the
//! report, resolve the registry code, resolve the match identifier, check
//! whether the patient record exists, create it if not, then deduplicate and
//! submit the observation batch. Each step's output gates whether the next
//! runs, and every failure collapses into the single terminal
//! [`SubmissionOutcome`].

use crate::adapters::registry::models::observation_entry;
use crate::adapters::registry::{RegistryApi, RegistryClient};
use crate::config::{MeridianConfig, RegistryConfig, SecretString};
use crate::core::submit::ccn::resolve_registry_code;
use crate::core::submit::dedup::select_new_observations;
use crate::domain::ids::RegistryCode;
use crate::domain::report::{ClinicalReport, PatientIdentity};
use crate::domain::{Result, SubmissionOutcome, SubmissionReceipt};

/// Submission pipeline
///
/// Holds only read-only configuration and the registry seam; invocations
/// share no mutable state, so one pipeline value can serve concurrent
/// submissions.
pub struct SubmissionPipeline {
    registry: Box<dyn RegistryApi>,
    config: RegistryConfig,
}

/// What `--dry-run` reports: everything knowable without a network call
#[derive(Debug, Clone)]
pub struct PreflightReport {
    /// Registry code resolved from the report
    pub registry_code: RegistryCode,

    /// The patient's identifying attributes
    pub patient: PatientIdentity,

    /// Total observation candidates in the content section
    pub candidate_observations: usize,

    /// Candidates that carry a source identifier and are eligible for
    /// submission
    pub sourced_observations: usize,
}

impl SubmissionPipeline {
    /// Create a new submission pipeline from configuration
    pub fn new(config: &MeridianConfig) -> Result<Self> {
        let registry = Box::new(RegistryClient::new(config.registry.clone())?);
        Ok(Self {
            registry,
            config: config.registry.clone(),
        })
    }

    /// Create a pipeline over an existing registry implementation
    ///
    /// Used by tests to swap in a stub; production code goes through
    /// [`SubmissionPipeline::new`].
    pub fn with_registry(registry: Box<dyn RegistryApi>, config: RegistryConfig) -> Self {
        Self { registry, config }
    }

    /// Validate a report and resolve its registry code without touching the
    /// network
    ///
    /// # Errors
    ///
    /// Returns a validation error for any report the full pipeline would
    /// reject before its first remote call.
    pub fn preflight(&self, report: &serde_json::Value) -> Result<PreflightReport> {
        let report = ClinicalReport::from_value(report)?;
        let registry_code = resolve_registry_code(&report, &self.config.ccn_system)?;
        let patient = report.patient_identity()?;

        let sourced_observations = report
            .observations
            .iter()
            .filter(|observation| observation.source_id.is_some())
            .count();

        Ok(PreflightReport {
            registry_code,
            patient,
            candidate_observations: report.observations.len(),
            sourced_observations,
        })
    }

    /// Run the full submission workflow for one report
    ///
    /// The outcome is the only channel results flow through; no partial
    /// state is exposed on failure. Nothing is retried internally — retry
    /// policy belongs to the caller.
    ///
    /// Known limitation: the existence check and the conditional create are
    /// two separate remote calls, so two concurrent invocations for the same
    /// match identifier can both observe "does not exist" and both attempt a
    /// create. Callers needing a strict single-creation guarantee must
    /// serialize invocations per match identifier, or rely on the registry
    /// rejecting or merging the duplicate.
    pub async fn submit(
        &self,
        report: &serde_json::Value,
        credential: &SecretString,
    ) -> SubmissionOutcome {
        let mut trail = Vec::new();

        let outcome = match self.run(report, credential, &mut trail).await {
            Ok(receipt) => SubmissionOutcome::Success(receipt),
            Err(err) => {
                tracing::error!(error = %err, "Submission pipeline aborted");
                SubmissionOutcome::from_error(&err, trail)
            }
        };

        outcome.log_summary();
        outcome
    }

    async fn run(
        &self,
        report: &serde_json::Value,
        credential: &SecretString,
        trail: &mut Vec<String>,
    ) -> Result<SubmissionReceipt> {
        let report = ClinicalReport::from_value(report)?;

        let code = resolve_registry_code(&report, &self.config.ccn_system)?;
        trail.push(format!("resolved registry code {code}"));

        let identity = report.patient_identity()?;
        let match_id = self
            .registry
            .resolve_match_id(credential, &code, &identity)
            .await?;
        trail.push(format!("resolved match identifier {match_id}"));

        let (remote_patient_id, patient_created) =
            match self.registry.find_patient(credential, &code, match_id).await? {
                Some(remote_id) => {
                    trail.push(format!("patient record already exists as {remote_id}"));
                    (remote_id, false)
                }
                None => {
                    let remote_id = self
                        .registry
                        .register_patient(credential, &code, match_id)
                        .await?;
                    trail.push(format!("created patient record {remote_id}"));
                    (remote_id, true)
                }
            };

        let selection = select_new_observations(
            self.registry.as_ref(),
            credential,
            &report.observations,
            patient_created,
        )
        .await?;

        if selection.missing_source_id > 0 {
            trail.push(format!(
                "skipped {} observations without a source identifier",
                selection.missing_source_id
            ));
        }
        if selection.already_submitted > 0 {
            trail.push(format!(
                "skipped {} already-submitted observations",
                selection.already_submitted
            ));
        }

        let observations_submitted = if selection.submit.is_empty() {
            // An empty atomic batch is never sent
            trail.push("no new observations to submit".to_string());
            0
        } else {
            let entries = selection
                .submit
                .iter()
                .map(|(source_id, observation)| {
                    observation_entry(&self.config, &code, &remote_patient_id, source_id, observation)
                })
                .collect::<Result<Vec<_>>>()?;

            let count = entries.len();
            self.registry.submit_batch(credential, entries).await?;
            trail.push(format!("submitted {count} observations in one batch"));
            count
        };

        Ok(SubmissionReceipt {
            match_id,
            patient_created,
            remote_patient_id,
            observations_submitted,
            trail: trail.clone(),
        })
    }
}
