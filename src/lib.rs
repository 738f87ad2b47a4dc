// Meridian - MedMorph to CIBMTR submission tool
// Copyright (c) 2025 Meridian Contributors
// Licensed under the MIT License

//! # Meridian - MedMorph to CIBMTR submission
//!
//! Meridian forwards MedMorph clinical reports to the CIBMTR transplant
//! registry. It runs a multi-step synchronization protocol against a remote
//! system that offers no transactional guarantees across its endpoints, and
//! keeps the whole operation idempotent under retry and safe against
//! duplicate submission.
//!
//! ## Overview
//!
//! One invocation walks a strictly sequential, short-circuiting pipeline:
//!
//! 1. **Validate** the inbound report and resolve the submitting
//!    organization's registry code (CCN)
//! 2. **Resolve** a durable match identifier (CRID) from the record-linkage
//!    service; only a single perfect match is accepted
//! 3. **Check** whether a patient record already exists for that identifier
//! 4. **Create** the patient record only if it doesn't
//! 5. **Deduplicate** the candidate observations by source identifier and
//!    submit the survivors as one atomic transaction bundle
//!
//! ## Architecture
//!
//! Meridian follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The submission workflow
//! - [`adapters`] - The registry HTTP integration
//! - [`domain`] - Core domain types and the report model
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meridian::config::{load_config, secret_from};
//! use meridian::core::submit::SubmissionPipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("meridian.toml")?;
//!     let pipeline = SubmissionPipeline::new(&config)?;
//!
//!     let report: serde_json::Value =
//!         serde_json::from_str(&std::fs::read_to_string("report.json")?)?;
//!
//!     let outcome = pipeline.submit(&report, &secret_from("token")).await;
//!     println!("success: {}", outcome.is_success());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failure collapses into one terminal
//! [`domain::SubmissionOutcome`] carrying a machine-readable category
//! (validation, identity-resolution, processing) and a diagnostic trail of
//! the steps that completed. Nothing is retried internally; retry policy
//! belongs to the caller.
//!
//! ## Logging
//!
//! Meridian uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting submission");
//! warn!(source_id = "urn:uuid:obs-1", "Observation already submitted");
//! error!(error = "no perfect match", "Submission failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
