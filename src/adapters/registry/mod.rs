//! Registry adapter
//!
//! Everything that knows how to talk to the registry's remote surface: the
//! [`RegistryApi`] seam, the reqwest-backed [`RegistryClient`], and the wire
//! models and payload builders.

pub mod api;
pub mod client;
pub mod models;

pub use api::RegistryApi;
pub use client::RegistryClient;
