//! Integration tests for report validation and registry-code resolution
//!
//! The pipeline must reject a malformed report before any network call, and
//! resolve the registry code deterministically from a valid one.

use meridian::core::submit::resolve_registry_code;
use meridian::domain::{ClinicalReport, MeridianError};
use serde_json::{json, Value};
use test_case::test_case;

const CCN_SYSTEM: &str = "http://cibmtr.org/codesystem/transplant-center";

fn patient_entry() -> Value {
    json!({
        "resource": {
            "resourceType": "Patient",
            "name": [{ "given": ["John"], "family": "Doe" }],
            "birthDate": "2000-01-01",
            "gender": "male"
        }
    })
}

fn valid_report() -> Value {
    json!({
        "resourceType": "Bundle",
        "entry": [
            {
                "resource": {
                    "resourceType": "MessageHeader",
                    "sender": { "reference": "Organization/org-1" }
                }
            },
            {
                "resource": {
                    "resourceType": "Bundle",
                    "entry": [patient_entry()]
                }
            },
            {
                "resource": {
                    "resourceType": "Organization",
                    "id": "org-1",
                    "identifier": [{ "system": CCN_SYSTEM, "value": "10001" }]
                }
            }
        ]
    })
}

#[test_case(json!({}) ; "empty object")]
#[test_case(json!({"resourceType": "Bundle", "entry": []}) ; "no entries")]
#[test_case(json!({"resourceType": "Bundle", "entry": [{"resource": {"resourceType": "MessageHeader"}}]}) ; "only a header")]
#[test_case(json!({
    "resourceType": "Bundle",
    "entry": [
        {"resource": {"resourceType": "Patient"}},
        {"resource": {"resourceType": "Bundle", "entry": []}}
    ]
}) ; "header missing")]
#[test_case(json!({
    "resourceType": "Bundle",
    "entry": [
        {"resource": {"resourceType": "MessageHeader"}},
        {"resource": {"resourceType": "Patient"}}
    ]
}) ; "content section missing")]
#[test_case(json!({
    "resourceType": "Bundle",
    "entry": [
        {"resource": {"resourceType": "MessageHeader"}},
        {"resource": {"resourceType": "Bundle", "entry": []}}
    ]
}) ; "no patient in content")]
fn invalid_reports_are_rejected(report: Value) {
    let err = ClinicalReport::from_value(&report).unwrap_err();
    assert!(matches!(err, MeridianError::Validation(_)));
}

#[test]
fn valid_report_parses() {
    let report = ClinicalReport::from_value(&valid_report()).unwrap();
    assert_eq!(report.organizations.len(), 1);
    assert!(report.observations.is_empty());
}

#[test_case("org-1", "Organization/org-1" ; "bare entry id")]
#[test_case("Organization/org-1", "Organization/org-1" ; "prefixed entry id")]
fn registry_code_resolves_for_both_id_forms(entry_id: &str, sender_ref: &str) {
    let report = json!({
        "resourceType": "Bundle",
        "entry": [
            {
                "resource": {
                    "resourceType": "MessageHeader",
                    "sender": { "reference": sender_ref }
                }
            },
            {
                "resource": {
                    "resourceType": "Bundle",
                    "entry": [patient_entry()]
                }
            },
            {
                "resource": {
                    "resourceType": "Organization",
                    "id": entry_id,
                    "identifier": [{ "system": CCN_SYSTEM, "value": "10001" }]
                }
            }
        ]
    });

    let report = ClinicalReport::from_value(&report).unwrap();
    let code = resolve_registry_code(&report, CCN_SYSTEM).unwrap();
    assert_eq!(code.as_str(), "10001");
}

#[test]
fn registry_code_never_guessed_for_unmatched_sender() {
    let mut report = valid_report();
    report["entry"][0]["resource"]["sender"]["reference"] = json!("Organization/someone-else");

    let report = ClinicalReport::from_value(&report).unwrap();
    let err = resolve_registry_code(&report, CCN_SYSTEM).unwrap_err();

    assert!(matches!(err, MeridianError::Validation(_)));
}

#[test]
fn organization_in_content_section_is_found() {
    let report = json!({
        "resourceType": "Bundle",
        "entry": [
            {
                "resource": {
                    "resourceType": "MessageHeader",
                    "sender": { "reference": "Organization/org-1" }
                }
            },
            {
                "resource": {
                    "resourceType": "Bundle",
                    "entry": [
                        patient_entry(),
                        {
                            "resource": {
                                "resourceType": "Organization",
                                "id": "org-1",
                                "identifier": [{ "system": CCN_SYSTEM, "value": "10042" }]
                            }
                        }
                    ]
                }
            }
        ]
    });

    let report = ClinicalReport::from_value(&report).unwrap();
    let code = resolve_registry_code(&report, CCN_SYSTEM).unwrap();
    assert_eq!(code.as_str(), "10042");
}

#[test]
fn patient_identity_requires_all_four_attributes() {
    let mut report = valid_report();
    report["entry"][1]["resource"]["entry"][0]["resource"]
        .as_object_mut()
        .unwrap()
        .remove("birthDate");

    let report = ClinicalReport::from_value(&report).unwrap();
    let err = report.patient_identity().unwrap_err();

    assert!(err.to_string().contains("birth date"));
}
