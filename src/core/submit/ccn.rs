//! Registry code resolution
//!
//! Pure lookup of the submitting organization's registry code from the
//! report: the header's sender reference names an organization entry, and
//! that organization's identifier list carries the code under the registry's
//! code system. No network calls happen here; the same report always
//! resolves to the same answer.

use crate::domain::errors::MeridianError;
use crate::domain::ids::RegistryCode;
use crate::domain::report::ClinicalReport;
use crate::domain::Result;

/// Resolve the registry code (CCN) for a report's sending organization
///
/// The sender reference is matched against organization entry ids both with
/// and without the `Organization/` prefix, since upstream producers are
/// inconsistent about including the resource type.
///
/// # Errors
///
/// Returns [`MeridianError::Validation`] when the sender reference is
/// missing or malformed, no organization entry matches it, or the matched
/// organization carries no identifier under `ccn_system`.
pub fn resolve_registry_code(report: &ClinicalReport, ccn_system: &str) -> Result<RegistryCode> {
    let sender_ref = report
        .header
        .sender
        .as_ref()
        .and_then(|sender| sender.reference.as_deref())
        .ok_or_else(|| {
            MeridianError::Validation("Report header has no sender reference".to_string())
        })?;

    let bare_id = sender_ref.split("Organization/").nth(1).ok_or_else(|| {
        MeridianError::Validation(format!(
            "Sender reference '{sender_ref}' is not an organization reference"
        ))
    })?;

    let organization = report
        .organizations
        .iter()
        .find(|org| {
            org.id.as_deref() == Some(sender_ref) || org.id.as_deref() == Some(bare_id)
        })
        .ok_or_else(|| {
            MeridianError::Validation(format!(
                "No organization entry matches sender reference '{sender_ref}'"
            ))
        })?;

    let code = organization
        .identifier
        .iter()
        .find_map(|identifier| match (&identifier.system, &identifier.value) {
            (Some(system), Some(value)) if system == ccn_system => Some(value.clone()),
            _ => None,
        })
        .ok_or_else(|| {
            MeridianError::Validation(format!(
                "Organization has no identifier under code system '{ccn_system}'"
            ))
        })?;

    RegistryCode::new(code).map_err(MeridianError::Validation)
}
