//! Registry HTTP client
//!
//! Reqwest-backed implementation of [`RegistryApi`]. One value of this type
//! serves any number of pipeline invocations; it holds only the HTTP client
//! and read-only configuration, never per-invocation state. Requests are not
//! retried here — retry policy belongs to the caller.

use crate::adapters::registry::api::RegistryApi;
use crate::adapters::registry::models::{
    patient_resource, transaction_bundle, CridRequest, CridResponse, SearchResponse,
};
use crate::config::{AuthScheme, RegistryConfig, SecretString};
use crate::domain::errors::{LinkageError, MeridianError, RegistryError};
use crate::domain::ids::{MatchId, RegistryCode, RemotePatientId, SourceId};
use crate::domain::report::PatientIdentity;
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

const FHIR_JSON: &str = "application/fhir+json";

/// Registry client
///
/// # Example
///
/// ```no_run
/// use meridian::adapters::registry::RegistryClient;
/// use meridian::config::RegistryConfig;
///
/// # fn example() -> meridian::domain::Result<()> {
/// let config = RegistryConfig::default();
/// let client = RegistryClient::new(config)?;
/// # Ok(())
/// # }
/// ```
pub struct RegistryClient {
    /// Base URL with the trailing slash normalized
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// Registry configuration
    config: RegistryConfig,
}

impl RegistryClient {
    /// Create a new registry client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the underlying HTTP client cannot be
    /// built.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| MeridianError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    /// Build the authorization header value for the configured scheme
    fn auth_header_value(&self, credential: &SecretString) -> String {
        match self.config.auth_scheme {
            AuthScheme::Raw => credential.expose_secret().as_ref().to_string(),
            AuthScheme::Bearer => format!("Bearer {}", credential.expose_secret().as_ref()),
        }
    }
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn resolve_match_id(
        &self,
        credential: &SecretString,
        code: &RegistryCode,
        patient: &PatientIdentity,
    ) -> Result<MatchId> {
        let url = format!("{}CRID", self.base_url);

        tracing::debug!(url = %url, ccn = %code, "Resolving match identifier");

        let response = self
            .client
            .put(&url)
            .header("Accept", "application/json")
            .header("Authorization", self.auth_header_value(credential))
            .json(&CridRequest::new(code, patient))
            .send()
            .await
            .map_err(|e| LinkageError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LinkageError::RequestFailed { status, message }.into());
        }

        let body: CridResponse = response
            .json()
            .await
            .map_err(|e| LinkageError::InvalidResponse(e.to_string()))?;

        match body.perfect_match.len() {
            0 => Err(LinkageError::NoPerfectMatch.into()),
            1 => {
                let match_id = MatchId::new(body.perfect_match[0].crid);
                tracing::debug!(match_id = %match_id, "Resolved match identifier");
                Ok(match_id)
            }
            count => Err(LinkageError::AmbiguousMatch { count }.into()),
        }
    }

    async fn find_patient(
        &self,
        credential: &SecretString,
        code: &RegistryCode,
        match_id: MatchId,
    ) -> Result<Option<RemotePatientId>> {
        let url = format!("{}Patient", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                (
                    "_security",
                    format!("{}|{}", self.config.ccn_system, code.security_code()),
                ),
                ("identifier", match_id.to_string()),
            ])
            .header("Content-Type", FHIR_JSON)
            .header("Authorization", self.auth_header_value(credential))
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RegistryError::SearchFailed { status, message }.into());
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        if body.total == 0 {
            return Ok(None);
        }

        let id = body
            .entry
            .first()
            .map(|entry| entry.resource.id.clone())
            .ok_or_else(|| {
                RegistryError::InvalidResponse(
                    "Patient search returned a nonzero total but no entries".to_string(),
                )
            })?;

        let remote_id =
            RemotePatientId::new(id).map_err(RegistryError::InvalidResponse)?;

        tracing::debug!(remote_patient_id = %remote_id, "Patient record already exists");
        Ok(Some(remote_id))
    }

    async fn register_patient(
        &self,
        credential: &SecretString,
        code: &RegistryCode,
        match_id: MatchId,
    ) -> Result<RemotePatientId> {
        let url = format!("{}Patient", self.base_url);

        tracing::debug!(ccn = %code, match_id = %match_id, "Creating patient record");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", FHIR_JSON)
            .header("Authorization", self.auth_header_value(credential))
            .json(&patient_resource(&self.config, code, match_id))
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let message = response.text().await.unwrap_or_default();
            return Err(RegistryError::CreateRejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(RegistryError::MissingLocation)?;

        let remote_id = parse_patient_location(location).ok_or(RegistryError::MissingLocation)?;

        tracing::info!(remote_patient_id = %remote_id, "Created patient record");
        Ok(remote_id)
    }

    async fn observation_exists(
        &self,
        credential: &SecretString,
        source_id: &SourceId,
    ) -> Result<bool> {
        let url = format!("{}Observation", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("identifier", source_id.as_str())])
            .header("Content-Type", FHIR_JSON)
            .header("Authorization", self.auth_header_value(credential))
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RegistryError::SearchFailed { status, message }.into());
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        Ok(body.total > 0)
    }

    async fn submit_batch(
        &self,
        credential: &SecretString,
        entries: Vec<serde_json::Value>,
    ) -> Result<()> {
        let url = format!("{}Bundle", self.base_url);
        let count = entries.len();

        tracing::debug!(count = count, "Submitting observation batch");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", FHIR_JSON)
            .header("Authorization", self.auth_header_value(credential))
            .json(&transaction_bundle(entries))
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RegistryError::SubmitFailed { status, message }.into());
        }

        tracing::info!(count = count, "Observation batch accepted");
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Extract the patient id from a create response's `Location` header
///
/// Accepts both bare `…/Patient/<id>` locations and versioned
/// `…/Patient/<id>/_history/<n>` ones.
fn parse_patient_location(location: &str) -> Option<RemotePatientId> {
    let remainder = location.split("Patient/").nth(1)?;
    let id = remainder.split('/').next()?;
    RemotePatientId::new(id).ok()
}
