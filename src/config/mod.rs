//! Configuration management
//!
//! TOML configuration with `${VAR}` environment substitution, `MERIDIAN_*`
//! overrides, and validation. Credentials are wrapped in [`SecretString`] so
//! they never leak through logs or debug output.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used items
pub use loader::load_config;
pub use schema::{ApplicationConfig, AuthScheme, LoggingConfig, MeridianConfig, RegistryConfig};
pub use secret::{secret_from, SecretString, SecretValue};
