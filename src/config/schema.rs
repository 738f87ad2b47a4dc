//! Configuration schema types
//!
//! This module defines the configuration structure for Meridian. Every
//! pipeline invocation is fully parameterized from one of these values;
//! nothing about the registry connection lives in mutable shared state.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// How the caller's credential is placed in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Send the credential verbatim
    #[default]
    Raw,
    /// Prefix the credential with `Bearer `
    Bearer,
}

/// Main Meridian configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeridianConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Registry connection settings
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeridianConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.registry.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Registry connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the registry API; a missing trailing slash is added at
    /// client construction
    pub base_url: String,

    /// Authorization header scheme
    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// Credential forwarded on every outbound call. Stored securely in
    /// memory and automatically zeroized on drop. Usually supplied via
    /// `${MERIDIAN_AUTH_TOKEN}` substitution rather than written into the
    /// file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Disabling this exposes the connection to man-in-the-middle attacks;
    /// only turn it off against a test registry.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Code system scoping security tags and organization identifiers
    #[serde(default = "default_ccn_system")]
    pub ccn_system: String,

    /// Code system for the match identifier on created patient records
    #[serde(default = "default_crid_system")]
    pub crid_system: String,

    /// Code system for observation source identifiers
    #[serde(default = "default_source_system")]
    pub source_system: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/registry".to_string(),
            auth_scheme: AuthScheme::Raw,
            auth_token: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            ccn_system: default_ccn_system(),
            crid_system: default_crid_system(),
            source_system: default_source_system(),
        }
    }
}

impl RegistryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("registry.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "registry.base_url must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("registry.timeout_seconds must be greater than zero".to_string());
        }

        if self.ccn_system.is_empty() {
            return Err("registry.ccn_system cannot be empty".to_string());
        }

        if self.crid_system.is_empty() {
            return Err("registry.crid_system cannot be empty".to_string());
        }

        if self.source_system.is_empty() {
            return Err("registry.source_system cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a local file in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_ccn_system() -> String {
    "http://cibmtr.org/codesystem/transplant-center".to_string()
}

fn default_crid_system() -> String {
    "http://cibmtr.org/identifier/CRID".to_string()
}

fn default_source_system() -> String {
    "urn:ietf:rfc:3986".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
