//! Built-in HTTP endpoints mounted next to the discovered routes.
//!
//! - `health`: liveness, version and metrics
//! - `docs`: route listing generated from the registry, JSON 404 fallback

pub mod docs;
pub mod health;
