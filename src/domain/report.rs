//! Inbound report model
//!
//! Wire model for the MedMorph report bundle plus the validated view the
//! pipeline actually works with. Report entries are a tagged representation
//! discriminated by `resourceType` rather than a resource class hierarchy;
//! anything the pipeline doesn't care about deserializes to [`Resource::Other`]
//! and is ignored.
//!
//! A report is an ordered sequence of two sections: a header naming the
//! sending organization, and a content bundle containing exactly one patient
//! and zero or more observations. [`ClinicalReport::from_value`] enforces
//! those invariants up front so the pipeline never starts on a report it
//! would have to abandon mid-flight.

use crate::domain::errors::MeridianError;
use crate::domain::ids::SourceId;
use crate::domain::result::Result;
use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level report bundle as received from the caller
#[derive(Debug, Clone, Deserialize)]
pub struct ReportBundle {
    /// Bundle entries; the first is the message header, the second the
    /// content section
    #[serde(default)]
    pub entry: Vec<ReportEntry>,
}

/// One entry in a report or content bundle
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// Source-local identifier for the entry; on observations this is the
    /// deduplication key
    #[serde(default)]
    pub full_url: Option<String>,

    /// The carried resource
    pub resource: Resource,
}

/// Report entry resource, discriminated by `resourceType`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    /// Report header naming the sender
    MessageHeader(MessageHeader),

    /// Nested content bundle
    Bundle(ContentBundle),

    /// Sending organization
    Organization(Organization),

    /// The reported patient
    Patient(Patient),

    /// A clinical observation
    Observation(Observation),

    /// Any resource type the pipeline doesn't process
    #[serde(other)]
    Other,
}

/// Report message header
#[derive(Debug, Clone, Deserialize)]
pub struct MessageHeader {
    /// Reference to the sending organization
    #[serde(default)]
    pub sender: Option<Reference>,
}

/// Nested content bundle carried as the report's second entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentBundle {
    #[serde(default)]
    pub entry: Vec<ReportEntry>,
}

/// A reference to another resource by opaque id
#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub reference: Option<String>,
}

/// Sending organization resource
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    /// Entry id the header's sender reference points at; producers are
    /// inconsistent about whether the resource-type prefix is included
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub identifier: Vec<Identifier>,
}

/// An identifier with its code system
#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

/// Patient resource from the content section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub name: Vec<HumanName>,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Patient name
#[derive(Debug, Clone, Deserialize)]
pub struct HumanName {
    #[serde(default)]
    pub given: Vec<String>,

    #[serde(default)]
    pub family: Option<String>,
}

/// Administrative gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// Display text as expected by the record-linkage service
    pub fn display(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::Unknown => "Unknown",
        }
    }
}

/// Observation resource from the content section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default)]
    pub code: Option<CodeableConcept>,

    #[serde(default)]
    pub value_quantity: Option<Quantity>,

    #[serde(default)]
    pub effective_date_time: Option<String>,
}

/// A coded concept
#[derive(Debug, Clone, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,
}

/// One coding of a concept
#[derive(Debug, Clone, Deserialize)]
pub struct Coding {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

/// A measured quantity
#[derive(Debug, Clone, Deserialize)]
pub struct Quantity {
    #[serde(default)]
    pub value: Option<serde_json::Number>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub code: Option<String>,
}

/// An observation paired with its source identifier, if it carries one
#[derive(Debug, Clone)]
pub struct SourcedObservation {
    /// Deduplication key; observations without one are never submitted
    pub source_id: Option<SourceId>,

    pub resource: Observation,
}

/// The four identifying attributes sent to the record-linkage service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIdentity {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

/// Validated view of an inbound report
///
/// Produced by [`ClinicalReport::from_value`]; holding one of these means
/// the report invariants held: a header section, a content section, and
/// exactly one patient.
#[derive(Debug, Clone)]
pub struct ClinicalReport {
    pub header: MessageHeader,

    /// Organization entries from the report, header and content sections
    /// both (producers are inconsistent about placement)
    pub organizations: Vec<Organization>,

    pub patient: Patient,

    pub observations: Vec<SourcedObservation>,
}

impl ClinicalReport {
    /// Parse and validate a report from its JSON value
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Validation`] if the report has fewer than two
    /// sections, the first is not a message header, the second is not a
    /// content bundle, the content does not contain exactly one patient, or
    /// a submittable observation is missing its coding or quantity.
    pub fn from_value(report: &serde_json::Value) -> Result<Self> {
        let bundle: ReportBundle = serde_json::from_value(report.clone())
            .map_err(|e| MeridianError::Validation(format!("Malformed report bundle: {e}")))?;
        Self::from_bundle(bundle)
    }

    /// Validate an already-deserialized report bundle
    pub fn from_bundle(bundle: ReportBundle) -> Result<Self> {
        if bundle.entry.len() < 2 {
            return Err(MeridianError::Validation(
                "Report must contain a header section and a content section".to_string(),
            ));
        }

        let mut entries = bundle.entry.into_iter();

        let header = match entries.next().map(|e| e.resource) {
            Some(Resource::MessageHeader(header)) => header,
            _ => {
                return Err(MeridianError::Validation(
                    "First report entry must be a message header".to_string(),
                ))
            }
        };

        let content = match entries.next().map(|e| e.resource) {
            Some(Resource::Bundle(content)) => content,
            _ => {
                return Err(MeridianError::Validation(
                    "Second report entry must be a content bundle".to_string(),
                ))
            }
        };

        let mut organizations = Vec::new();
        for entry in entries {
            if let Resource::Organization(org) = entry.resource {
                organizations.push(org);
            }
        }

        let mut patients = Vec::new();
        let mut observations = Vec::new();
        for entry in content.entry {
            match entry.resource {
                Resource::Patient(patient) => patients.push(patient),
                Resource::Observation(observation) => {
                    let source_id = match entry.full_url {
                        Some(url) => SourceId::new(url).ok(),
                        None => None,
                    };
                    observations.push(SourcedObservation {
                        source_id,
                        resource: observation,
                    });
                }
                Resource::Organization(org) => organizations.push(org),
                _ => {}
            }
        }

        let patient = match patients.len() {
            0 => {
                return Err(MeridianError::Validation(
                    "Content section contains no patient record".to_string(),
                ))
            }
            1 => patients.remove(0),
            n => {
                return Err(MeridianError::Validation(format!(
                    "Content section contains {n} patient records, expected exactly one"
                )))
            }
        };

        // Submittable observations must be expressible as registry payloads.
        // Unsourced ones are dropped before submission, so their shape
        // doesn't matter here.
        for observation in &observations {
            if let Some(source_id) = &observation.source_id {
                let resource = &observation.resource;
                let has_coding = resource
                    .code
                    .as_ref()
                    .is_some_and(|code| !code.coding.is_empty());
                if !has_coding {
                    return Err(MeridianError::Validation(format!(
                        "Observation {source_id} has no coding"
                    )));
                }
                let has_value = resource
                    .value_quantity
                    .as_ref()
                    .is_some_and(|quantity| quantity.value.is_some());
                if !has_value {
                    return Err(MeridianError::Validation(format!(
                        "Observation {source_id} has no quantity value"
                    )));
                }
            }
        }

        Ok(Self {
            header,
            organizations,
            patient,
            observations,
        })
    }

    /// Extract the patient's four identifying attributes
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Validation`] if any of the four attributes
    /// is missing; without all of them the linkage service cannot match.
    pub fn patient_identity(&self) -> Result<PatientIdentity> {
        let name = self
            .patient
            .name
            .first()
            .ok_or_else(|| MeridianError::Validation("Patient has no name".to_string()))?;

        let first_name = name
            .given
            .first()
            .cloned()
            .ok_or_else(|| MeridianError::Validation("Patient has no given name".to_string()))?;

        let last_name = name
            .family
            .clone()
            .ok_or_else(|| MeridianError::Validation("Patient has no family name".to_string()))?;

        let birth_date = self
            .patient
            .birth_date
            .ok_or_else(|| MeridianError::Validation("Patient has no birth date".to_string()))?;

        let gender = self
            .patient
            .gender
            .ok_or_else(|| MeridianError::Validation("Patient has no gender".to_string()))?;

        Ok(PatientIdentity {
            first_name,
            last_name,
            birth_date,
            gender,
        })
    }
}
