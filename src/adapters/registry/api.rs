//! Registry API trait definition
//!
//! This module defines the `RegistryApi` trait that abstracts the registry's
//! remote surface (record linkage plus the FHIR endpoints) behind one
//! interface. The pipeline only ever talks to this trait, which keeps every
//! step independently testable and the HTTP details in one place.

use crate::domain::ids::{MatchId, RegistryCode, RemotePatientId, SourceId};
use crate::domain::report::PatientIdentity;
use crate::domain::Result;
use crate::config::SecretString;
use async_trait::async_trait;

/// Trait for the registry's remote operations
///
/// The caller's opaque credential is passed into every method and forwarded
/// verbatim (or bearer-prefixed, per configuration) on the outbound call; no
/// credential state is kept between calls.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Resolve the durable match identifier for a patient's identifying
    /// attributes
    ///
    /// Only a single perfect match is accepted; zero or multiple perfect
    /// matches are identity-resolution failures.
    async fn resolve_match_id(
        &self,
        credential: &SecretString,
        code: &RegistryCode,
        patient: &PatientIdentity,
    ) -> Result<MatchId>;

    /// Look up an existing patient record by security tag and match
    /// identifier
    ///
    /// A search that executes and finds nothing returns `Ok(None)` — that
    /// answer is authoritative. A search that fails to execute returns an
    /// error so transient faults never read as "does not exist".
    async fn find_patient(
        &self,
        credential: &SecretString,
        code: &RegistryCode,
        match_id: MatchId,
    ) -> Result<Option<RemotePatientId>>;

    /// Create a patient record anchored to the match identifier and return
    /// the registry's id for it
    async fn register_patient(
        &self,
        credential: &SecretString,
        code: &RegistryCode,
        match_id: MatchId,
    ) -> Result<RemotePatientId>;

    /// Whether an observation with this source identifier already exists
    /// remotely
    async fn observation_exists(
        &self,
        credential: &SecretString,
        source_id: &SourceId,
    ) -> Result<bool>;

    /// Submit prepared observation entries as one atomic transaction bundle
    ///
    /// Callers must not pass an empty entry list; skipping an empty batch is
    /// the pipeline's job.
    async fn submit_batch(
        &self,
        credential: &SecretString,
        entries: Vec<serde_json::Value>,
    ) -> Result<()>;

    /// Base URL this implementation talks to
    fn base_url(&self) -> &str;
}
