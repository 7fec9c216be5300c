//! Auth types shared across Atelier services.
//!
//! Provides the signed token format (minting is reserved for the auth service),
//! access-token validation, cookie builders, and the `Identity` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
