//! Observation deduplication
//!
//! Decides which candidate observations go into the batch. Candidates
//! without a source identifier can't be deduplicated safely and are dropped.
//! When the patient record already existed, each remaining candidate is
//! checked against the registry by its source identifier; for a patient
//! created by this invocation the checks are skipped outright, since no
//! observations can exist yet for a brand-new record.
//!
//! A dedup query that fails to execute aborts the whole step. Silently
//! including or excluding an unverified observation would make duplicate
//! submission non-deterministic.

use crate::adapters::registry::RegistryApi;
use crate::config::SecretString;
use crate::domain::ids::SourceId;
use crate::domain::report::{Observation, SourcedObservation};
use crate::domain::Result;

/// What survived filtering, plus counts of what didn't
#[derive(Debug)]
pub struct DedupSelection<'a> {
    /// Observations to include in the batch, with their source identifiers
    pub submit: Vec<(&'a SourceId, &'a Observation)>,

    /// Candidates dropped for lacking a source identifier
    pub missing_source_id: usize,

    /// Candidates dropped because the registry already has them
    pub already_submitted: usize,
}

/// Select the observations that are new to the registry
pub async fn select_new_observations<'a>(
    registry: &dyn RegistryApi,
    credential: &SecretString,
    candidates: &'a [SourcedObservation],
    patient_is_new: bool,
) -> Result<DedupSelection<'a>> {
    let mut selection = DedupSelection {
        submit: Vec::new(),
        missing_source_id: 0,
        already_submitted: 0,
    };

    for candidate in candidates {
        let source_id = match &candidate.source_id {
            Some(source_id) => source_id,
            None => {
                tracing::warn!("Skipping observation without a source identifier");
                selection.missing_source_id += 1;
                continue;
            }
        };

        if !patient_is_new && registry.observation_exists(credential, source_id).await? {
            tracing::debug!(source_id = %source_id, "Observation already submitted, skipping");
            selection.already_submitted += 1;
            continue;
        }

        selection.submit.push((source_id, &candidate.resource));
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_from, SecretString};
    use crate::domain::errors::RegistryError;
    use crate::domain::ids::{MatchId, RegistryCode, RemotePatientId};
    use crate::domain::report::PatientIdentity;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Registry stub that only answers existence checks
    struct StubRegistry {
        existing: HashSet<String>,
        fail_queries: bool,
        queries: AtomicUsize,
    }

    impl StubRegistry {
        fn new(existing: &[&str]) -> Self {
            Self {
                existing: existing.iter().map(|s| s.to_string()).collect(),
                fail_queries: false,
                queries: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                existing: HashSet::new(),
                fail_queries: true,
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RegistryApi for StubRegistry {
        async fn resolve_match_id(
            &self,
            _credential: &SecretString,
            _code: &RegistryCode,
            _patient: &PatientIdentity,
        ) -> Result<MatchId> {
            unreachable!("dedup never resolves match ids")
        }

        async fn find_patient(
            &self,
            _credential: &SecretString,
            _code: &RegistryCode,
            _match_id: MatchId,
        ) -> Result<Option<RemotePatientId>> {
            unreachable!("dedup never searches patients")
        }

        async fn register_patient(
            &self,
            _credential: &SecretString,
            _code: &RegistryCode,
            _match_id: MatchId,
        ) -> Result<RemotePatientId> {
            unreachable!("dedup never creates patients")
        }

        async fn observation_exists(
            &self,
            _credential: &SecretString,
            source_id: &SourceId,
        ) -> Result<bool> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.fail_queries {
                return Err(RegistryError::ConnectionFailed("boom".to_string()).into());
            }
            Ok(self.existing.contains(source_id.as_str()))
        }

        async fn submit_batch(
            &self,
            _credential: &SecretString,
            _entries: Vec<serde_json::Value>,
        ) -> Result<()> {
            unreachable!("dedup never submits")
        }

        fn base_url(&self) -> &str {
            "stub"
        }
    }

    fn candidate(source_id: Option<&str>) -> SourcedObservation {
        SourcedObservation {
            source_id: source_id.map(|s| SourceId::from_str(s).unwrap()),
            resource: serde_json::from_value(serde_json::json!({
                "resourceType": "Observation",
                "code": { "coding": [{ "code": "8302-2" }] },
                "valueQuantity": { "value": 1.0 }
            }))
            .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_drops_unsourced_candidates() {
        let registry = StubRegistry::new(&[]);
        let candidates = vec![candidate(Some("urn:uuid:a")), candidate(None)];

        let selection =
            select_new_observations(&registry, &secret_from("t"), &candidates, false)
                .await
                .unwrap();

        assert_eq!(selection.submit.len(), 1);
        assert_eq!(selection.missing_source_id, 1);
        assert_eq!(selection.already_submitted, 0);
    }

    #[tokio::test]
    async fn test_skips_already_submitted() {
        let registry = StubRegistry::new(&["urn:uuid:a", "urn:uuid:c"]);
        let candidates = vec![
            candidate(Some("urn:uuid:a")),
            candidate(Some("urn:uuid:b")),
            candidate(Some("urn:uuid:c")),
        ];

        let selection =
            select_new_observations(&registry, &secret_from("t"), &candidates, false)
                .await
                .unwrap();

        assert_eq!(selection.submit.len(), 1);
        assert_eq!(selection.submit[0].0.as_str(), "urn:uuid:b");
        assert_eq!(selection.already_submitted, 2);
        assert_eq!(registry.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_new_patient_skips_existence_queries() {
        let registry = StubRegistry::new(&["urn:uuid:a"]);
        let candidates = vec![candidate(Some("urn:uuid:a")), candidate(Some("urn:uuid:b"))];

        let selection = select_new_observations(&registry, &secret_from("t"), &candidates, true)
            .await
            .unwrap();

        // Everything survives and nothing was queried
        assert_eq!(selection.submit.len(), 2);
        assert_eq!(registry.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_query_aborts_selection() {
        let registry = StubRegistry::failing();
        let candidates = vec![candidate(Some("urn:uuid:a"))];

        let result =
            select_new_observations(&registry, &secret_from("t"), &candidates, false).await;

        assert!(result.is_err());
    }
}
