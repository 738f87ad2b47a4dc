//! Submit command implementation
//!
//! This module implements the `submit` command: run the full submission
//! pipeline for one report file, or just the preflight checks with
//! `--dry-run`.
//!
//! Exit codes: 0 on success, 1 on submission failure or unreadable report,
//! 2 on configuration error.

use crate::config::{load_config, secret_from, SecretString};
use crate::core::submit::SubmissionPipeline;
use crate::domain::SubmissionOutcome;
use clap::Args;

/// Arguments for the submit command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Path to the report JSON file
    pub report: String,

    /// Credential forwarded on every registry call; falls back to
    /// registry.auth_token from the configuration
    #[arg(long, env = "MERIDIAN_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Validate the report and resolve the registry code without calling
    /// the registry
    #[arg(long)]
    pub dry_run: bool,
}

impl SubmitArgs {
    /// Execute the submit command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(report = %self.report, "Starting submit command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ Configuration error: {e}");
                return Ok(2);
            }
        };

        let report_text = match std::fs::read_to_string(&self.report) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ Failed to read report file {}: {e}", self.report);
                return Ok(1);
            }
        };

        let report: serde_json::Value = match serde_json::from_str(&report_text) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("❌ Report file {} is not valid JSON: {e}", self.report);
                return Ok(1);
            }
        };

        let pipeline = match SubmissionPipeline::new(&config) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                eprintln!("❌ Configuration error: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            return self.execute_dry_run(&pipeline, &report);
        }

        let credential: SecretString = match &self.token {
            Some(token) => secret_from(token.clone()),
            None => match &config.registry.auth_token {
                Some(token) => token.clone(),
                None => {
                    eprintln!(
                        "❌ No credential provided. Pass --token, set MERIDIAN_AUTH_TOKEN, \
                         or configure registry.auth_token"
                    );
                    return Ok(2);
                }
            },
        };

        let outcome = pipeline.submit(&report, &credential).await;

        match outcome {
            SubmissionOutcome::Success(receipt) => {
                println!("✅ Submission completed");
                println!();
                for line in &receipt.trail {
                    println!("  - {line}");
                }
                println!();
                println!("  Match identifier: {}", receipt.match_id);
                println!(
                    "  Patient record: {} ({})",
                    receipt.remote_patient_id,
                    if receipt.patient_created {
                        "newly created"
                    } else {
                        "already existed"
                    }
                );
                println!("  Observations submitted: {}", receipt.observations_submitted);
                Ok(0)
            }
            SubmissionOutcome::Failure(failure) => {
                eprintln!("❌ Submission failed ({})", failure.category.as_str());
                eprintln!("   {}", failure.message);
                if let Some(detail) = &failure.detail {
                    eprintln!("   Caused by: {detail}");
                }
                for line in &failure.trail {
                    eprintln!("   completed: {line}");
                }
                Ok(1)
            }
        }
    }

    fn execute_dry_run(
        &self,
        pipeline: &SubmissionPipeline,
        report: &serde_json::Value,
    ) -> anyhow::Result<i32> {
        println!("🔍 Dry run: validating report without contacting the registry");
        println!();

        match pipeline.preflight(report) {
            Ok(preflight) => {
                println!("✅ Report is valid");
                println!("  Registry code: {}", preflight.registry_code);
                println!(
                    "  Patient: {} {} ({}, {})",
                    preflight.patient.first_name,
                    preflight.patient.last_name,
                    preflight.patient.birth_date,
                    preflight.patient.gender.display()
                );
                println!(
                    "  Observations: {} candidates, {} submittable",
                    preflight.candidate_observations, preflight.sourced_observations
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Report validation failed: {e}");
                Ok(1)
            }
        }
    }
}
