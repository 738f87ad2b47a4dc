//! Domain models and types for Meridian.
//!
//! This module contains the core domain models and business rules for the
//! submission workflow.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RegistryCode`], [`MatchId`],
//!   [`SourceId`], [`RemotePatientId`])
//! - **The inbound report model** ([`ClinicalReport`] and its wire types)
//! - **Error types** ([`MeridianError`], [`LinkageError`], [`RegistryError`])
//! - **The terminal outcome** ([`SubmissionOutcome`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Meridian uses the newtype pattern for identifiers to prevent mixing the
//! different id spaces that flow through the pipeline:
//!
//! ```rust
//! use meridian::domain::{MatchId, SourceId};
//! use std::str::FromStr;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let crid = MatchId::new(1982897480019337);
//! let source_id = SourceId::from_str("urn:uuid:obs-1")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: MatchId = source_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`]:
//!
//! ```rust
//! use meridian::domain::{MeridianError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(MeridianError::Validation("report has no patient".to_string()))
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod report;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{LinkageError, MeridianError, RegistryError};
pub use ids::{MatchId, RegistryCode, RemotePatientId, SourceId};
pub use outcome::{FailureCategory, SubmissionFailure, SubmissionOutcome, SubmissionReceipt};
pub use report::{ClinicalReport, PatientIdentity, SourcedObservation};
pub use result::Result;
