//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Meridian configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing, so a successful load means a
        // valid configuration
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                println!("  Registry: {}", config.registry.base_url);
                println!("  Auth Scheme: {:?}", config.registry.auth_scheme);
                println!("  Timeout: {}s", config.registry.timeout_seconds);
                println!("  CCN System: {}", config.registry.ccn_system);
                println!("  CRID System: {}", config.registry.crid_system);
                println!(
                    "  Credential configured: {}",
                    if config.registry.auth_token.is_some() {
                        "yes"
                    } else {
                        "no (pass --token at submit time)"
                    }
                );
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                Ok(2)
            }
        }
    }
}
