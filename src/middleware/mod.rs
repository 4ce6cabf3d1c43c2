//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered around the discovered routes: correlation
//! ids, security headers and CORS.

pub mod cors;
pub mod request_id;
pub mod security_headers;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};
pub use security_headers::{security_headers_middleware, SecurityHeaders};
