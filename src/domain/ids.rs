//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the submission
//! pipeline. Each type ensures the different id spaces (registry code, match
//! identifier, observation source id, remote resource id) can't be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry code (CCN) newtype wrapper
///
/// The organization-level code that scopes every security tag and query
/// against the registry. Resolved once per report and reused for every
/// subsequent call.
///
/// # Examples
///
/// ```
/// use meridian::domain::ids::RegistryCode;
/// use std::str::FromStr;
///
/// let ccn = RegistryCode::from_str("10001").unwrap();
/// assert_eq!(ccn.as_str(), "10001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryCode(String);

impl RegistryCode {
    /// Creates a new RegistryCode from a string
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err("Registry code cannot be empty".to_string());
        }
        Ok(Self(code))
    }

    /// Returns the registry code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `rc_`-prefixed security code scoping records to this organization
    pub fn security_code(&self) -> String {
        format!("rc_{}", self.0)
    }
}

impl fmt::Display for RegistryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RegistryCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RegistryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Match identifier (CRID) newtype wrapper
///
/// The durable numeric identifier the record-linkage service assigns to a
/// patient's identifying attributes. This is the idempotency key for the
/// whole downstream pipeline: the same four attributes always resolve to the
/// same value (stability assumed, not verified locally).
///
/// # Examples
///
/// ```
/// use meridian::domain::ids::MatchId;
///
/// let crid = MatchId::new(1982897480019337);
/// assert_eq!(crid.to_string(), "1982897480019337");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(u64);

impl MatchId {
    /// Creates a new MatchId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MatchId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid match identifier '{s}': {e}"))
    }
}

/// Observation source identifier newtype wrapper
///
/// The stable, caller-assigned identifier carried on an observation (its
/// `fullUrl` in the content section). Used as the deduplication key on
/// resubmission; an observation without one is never submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a new SourceId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Source identifier cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the source identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remote patient resource id newtype wrapper
///
/// The registry's own id for a patient record, extracted from the `Location`
/// header on create or from a search result. Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePatientId(String);

impl RemotePatientId {
    /// Creates a new RemotePatientId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Remote patient id cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the remote id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemotePatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
