//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "meridian.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Meridian configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your registry URL", self.output);
                println!("  2. Set MERIDIAN_AUTH_TOKEN with your registry credential");
                println!("  3. Validate configuration: meridian validate-config");
                println!("  4. Submit a report: meridian submit report.json");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate the starter configuration
    fn generate_config() -> String {
        r#"# Meridian Configuration File
# MedMorph to CIBMTR submission tool

[application]
log_level = "info"

[registry]
base_url = "https://registry.example.org/fhir"

# Authorization header scheme: raw | bearer
auth_scheme = "raw"

# Credential forwarded on every registry call. Prefer the environment
# variable over writing a token into this file:
# auth_token = "${MERIDIAN_AUTH_TOKEN}"

# Per-request timeout
timeout_seconds = 30

# TLS settings
tls_verify = true

# Code systems; the defaults match the CIBMTR registry
# ccn_system = "http://cibmtr.org/codesystem/transplant-center"
# crid_system = "http://cibmtr.org/identifier/CRID"
# source_system = "urn:ietf:rfc:3986"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }
}
