//! Registry API models
//!
//! Request and response structures for the registry's wire surface, plus the
//! builders for every payload the workflow writes. These models are separate
//! from the domain report types: the registry accepts a narrower shape than
//! the inbound report carries.

use crate::config::RegistryConfig;
use crate::domain::errors::MeridianError;
use crate::domain::ids::{MatchId, RegistryCode, RemotePatientId, SourceId};
use crate::domain::report::{Observation, PatientIdentity};
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Body of the `PUT /CRID` request
#[derive(Debug, Serialize)]
pub struct CridRequest {
    pub ccn: String,
    pub patient: CridPatient,
}

/// Patient attributes as the linkage service expects them
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CridPatient {
    pub first_name: String,
    pub last_name: String,
    /// ISO date, `YYYY-MM-DD`
    pub birth_date: String,
    /// Administrative gender display text
    pub gender: String,
}

impl CridRequest {
    pub fn new(code: &RegistryCode, patient: &PatientIdentity) -> Self {
        Self {
            ccn: code.as_str().to_string(),
            patient: CridPatient {
                first_name: patient.first_name.clone(),
                last_name: patient.last_name.clone(),
                birth_date: patient.birth_date.format("%Y-%m-%d").to_string(),
                gender: patient.gender.display().to_string(),
            },
        }
    }
}

/// Body of the `PUT /CRID` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CridResponse {
    #[serde(default)]
    pub perfect_match: Vec<CridCandidate>,
}

/// One candidate in the perfect-match list
#[derive(Debug, Deserialize)]
pub struct CridCandidate {
    pub crid: u64,
}

/// Registry search response (`Patient` and `Observation` searches share it)
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    #[serde(default)]
    pub entry: Vec<SearchEntry>,
}

/// One search result entry
#[derive(Debug, Deserialize)]
pub struct SearchEntry {
    pub resource: SearchResource,
}

/// The resource inside a search entry; only the id matters here
#[derive(Debug, Deserialize)]
pub struct SearchResource {
    pub id: String,
}

/// Build the access-control tag attached to every record the workflow
/// creates
///
/// The tag is `{system: <ccn code-system>, code: "rc_" + ccn}` under
/// `meta.security`, scoping visibility to the submitting organization.
pub fn security_meta(ccn_system: &str, code: &RegistryCode) -> Value {
    json!({
        "security": [{
            "system": ccn_system,
            "code": code.security_code(),
        }]
    })
}

/// Build the patient record created for a match identifier
///
/// The record carries no clinical content; it exists purely as an anchor for
/// observation submissions.
pub fn patient_resource(config: &RegistryConfig, code: &RegistryCode, match_id: MatchId) -> Value {
    json!({
        "resourceType": "Patient",
        "meta": security_meta(&config.ccn_system, code),
        "text": { "status": "empty" },
        "identifier": [{
            "use": "official",
            "system": config.crid_system,
            "value": match_id.to_string(),
        }]
    })
}

/// Build one transaction-bundle entry for an observation
///
/// The subject reference is rewritten to the remote patient id, the security
/// tag attached, and the source identifier recorded as an official
/// identifier so future submissions can detect the duplicate.
///
/// # Errors
///
/// Returns a validation error if the observation has no first coding or no
/// quantity value; report validation normally rejects these before the
/// pipeline starts.
pub fn observation_entry(
    config: &RegistryConfig,
    code: &RegistryCode,
    patient_id: &RemotePatientId,
    source_id: &SourceId,
    observation: &Observation,
) -> Result<Value> {
    let coding = observation
        .code
        .as_ref()
        .and_then(|concept| concept.coding.first())
        .ok_or_else(|| {
            MeridianError::Validation(format!("Observation {source_id} has no coding"))
        })?;

    let quantity = observation
        .value_quantity
        .as_ref()
        .filter(|quantity| quantity.value.is_some())
        .ok_or_else(|| {
            MeridianError::Validation(format!("Observation {source_id} has no quantity value"))
        })?;

    let mut coding_object = Map::new();
    if let Some(system) = &coding.system {
        coding_object.insert("system".to_string(), json!(system));
    }
    if let Some(code_value) = &coding.code {
        coding_object.insert("code".to_string(), json!(code_value));
    }
    if let Some(display) = &coding.display {
        coding_object.insert("display".to_string(), json!(display));
    }

    let mut quantity_object = Map::new();
    if let Some(value) = &quantity.value {
        quantity_object.insert("value".to_string(), Value::Number(value.clone()));
    }
    if let Some(unit) = &quantity.unit {
        quantity_object.insert("unit".to_string(), json!(unit));
    }
    if let Some(system) = &quantity.system {
        quantity_object.insert("system".to_string(), json!(system));
    }
    if let Some(code_value) = &quantity.code {
        quantity_object.insert("code".to_string(), json!(code_value));
    }

    let mut resource = json!({
        "resourceType": "Observation",
        "meta": security_meta(&config.ccn_system, code),
        "subject": { "reference": format!("Patient/{patient_id}") },
        "code": { "coding": [Value::Object(coding_object)] },
        "valueQuantity": Value::Object(quantity_object),
        "identifier": [{
            "use": "official",
            "system": config.source_system,
            "value": source_id.as_str(),
        }]
    });

    if let Some(effective) = &observation.effective_date_time {
        resource["effectiveDateTime"] = json!(effective);
    }

    Ok(json!({
        "request": { "method": "POST", "url": "Observation" },
        "resource": resource,
    }))
}

/// Wrap prepared entries into one atomic transaction bundle
pub fn transaction_bundle(entries: Vec<Value>) -> Value {
    json!({
        "resourceType": "Bundle",
        "type": "transaction",
        "entry": entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{Gender, Observation};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn code() -> RegistryCode {
        RegistryCode::from_str("10001").unwrap()
    }

    fn observation() -> Observation {
        serde_json::from_value(json!({
            "resourceType": "Observation",
            "effectiveDateTime": "2024-03-01T10:00:00Z",
            "code": { "coding": [{ "system": "http://loinc.org", "code": "8302-2", "display": "Body height" }] },
            "valueQuantity": { "value": 69.8, "unit": "cm", "system": "http://unitsofmeasure.org", "code": "cm" }
        }))
        .unwrap()
    }

    #[test]
    fn test_security_meta_shape() {
        let meta = security_meta("http://cibmtr.org/codesystem/transplant-center", &code());
        assert_eq!(
            meta["security"][0]["system"],
            "http://cibmtr.org/codesystem/transplant-center"
        );
        assert_eq!(meta["security"][0]["code"], "rc_10001");
        assert_eq!(meta["security"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_crid_request_formats_attributes() {
        let identity = PatientIdentity {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: Gender::Male,
        };
        let request = CridRequest::new(&code(), &identity);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["ccn"], "10001");
        assert_eq!(value["patient"]["firstName"], "John");
        assert_eq!(value["patient"]["lastName"], "Doe");
        assert_eq!(value["patient"]["birthDate"], "2000-01-01");
        assert_eq!(value["patient"]["gender"], "Male");
    }

    #[test]
    fn test_patient_resource_shape() {
        let config = RegistryConfig::default();
        let resource = patient_resource(&config, &code(), MatchId::new(1982897480019337));

        assert_eq!(resource["resourceType"], "Patient");
        assert_eq!(resource["text"]["status"], "empty");
        assert_eq!(resource["meta"]["security"][0]["code"], "rc_10001");
        assert_eq!(resource["identifier"][0]["use"], "official");
        assert_eq!(
            resource["identifier"][0]["system"],
            "http://cibmtr.org/identifier/CRID"
        );
        assert_eq!(resource["identifier"][0]["value"], "1982897480019337");
    }

    #[test]
    fn test_observation_entry_shape() {
        let config = RegistryConfig::default();
        let patient_id = RemotePatientId::from_str("8557319952834071").unwrap();
        let source_id = SourceId::from_str("urn:uuid:obs-height").unwrap();

        let entry =
            observation_entry(&config, &code(), &patient_id, &source_id, &observation()).unwrap();

        assert_eq!(entry["request"]["method"], "POST");
        assert_eq!(entry["request"]["url"], "Observation");

        let resource = &entry["resource"];
        assert_eq!(resource["resourceType"], "Observation");
        assert_eq!(
            resource["subject"]["reference"],
            "Patient/8557319952834071"
        );
        assert_eq!(resource["effectiveDateTime"], "2024-03-01T10:00:00Z");
        assert_eq!(resource["code"]["coding"][0]["code"], "8302-2");
        assert_eq!(resource["valueQuantity"]["value"], 69.8);
        assert_eq!(resource["valueQuantity"]["unit"], "cm");
        assert_eq!(resource["identifier"][0]["system"], "urn:ietf:rfc:3986");
        assert_eq!(resource["identifier"][0]["value"], "urn:uuid:obs-height");
    }

    #[test]
    fn test_observation_entry_without_coding_fails() {
        let config = RegistryConfig::default();
        let patient_id = RemotePatientId::from_str("p-1").unwrap();
        let source_id = SourceId::from_str("urn:uuid:obs-1").unwrap();
        let observation: Observation = serde_json::from_value(json!({
            "resourceType": "Observation",
            "valueQuantity": { "value": 1.0 }
        }))
        .unwrap();

        let result = observation_entry(&config, &code(), &patient_id, &source_id, &observation);
        assert!(result.is_err());
    }

    #[test]
    fn test_transaction_bundle_shape() {
        let bundle = transaction_bundle(vec![json!({"request": {}})]);
        assert_eq!(bundle["resourceType"], "Bundle");
        assert_eq!(bundle["type"], "transaction");
        assert_eq!(bundle["entry"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_crid_response_parses_empty_match_list() {
        let response: CridResponse = serde_json::from_value(json!({"perfectMatch": []})).unwrap();
        assert!(response.perfect_match.is_empty());

        let response: CridResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.perfect_match.is_empty());
    }

    #[test]
    fn test_search_response_parses() {
        let response: SearchResponse = serde_json::from_value(json!({
            "total": 1,
            "entry": [{ "resource": { "id": "abc" } }]
        }))
        .unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.entry[0].resource.id, "abc");
    }
}
