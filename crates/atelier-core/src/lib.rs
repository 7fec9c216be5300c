//! Ambient plumbing shared by Atelier services: configuration loading,
//! tracing setup, health probes, request ids, and wire formats.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
