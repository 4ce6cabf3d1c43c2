//! # Pfadfinder
//!
//! Bootstrap layer for axum services whose API is laid out on disk. Route
//! modules live in a directory tree, one subdirectory per API version, and the
//! path of each file decides its URL:
//!
//! ```text
//! api/
//! └── v1/
//!     ├── index.rs            → /api/v1
//!     └── users/
//!         ├── index.rs        → /api/v1/users
//!         └── [id].rs         → /api/v1/users/:id
//! ```
//!
//! ## Core Components
//!
//! - [`discovery`]: walks the route tree, derives patterns, loads modules and
//!   binds them into a frozen [`discovery::Registry`]
//! - [`codegen`]: build-time generation of the module catalog
//! - [`app`]: assembles the router with the built-in endpoints and middleware
//! - [`config`]: layered configuration (embedded defaults, file, environment)
//! - [`error`]: JSON error envelope for HTTP handlers
//! - [`middleware`]: correlation ids, security headers, CORS
//! - [`routes`]: health, metrics, version and route documentation endpoints
//! - [`state`]: shared application state
//! - [`metrics`]: discovery and request counters

pub mod app;
pub mod codegen;
pub mod config;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;
