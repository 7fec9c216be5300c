//! Domain types shared across all Atelier services.
//!
//! This crate contains only pure types with no framework dependencies.

pub mod email;
pub mod user;
