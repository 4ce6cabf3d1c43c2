//! Security headers for every response.
//!
//! The static set (nosniff, frame options, referrer and permissions policy,
//! COOP/CORP) is always sent. HSTS and CSP come from the `[security]` config
//! section and are rendered once at startup.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::SecurityConfig;

const DEFAULT_HSTS_MAX_AGE: u64 = 31_536_000;

const STATIC_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
];

/// Headers rendered from configuration.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeaders {
    hsts: Option<HeaderValue>,
    csp: Option<HeaderValue>,
}

impl SecurityHeaders {
    pub fn from_config(cfg: Option<&SecurityConfig>) -> Self {
        let Some(sec) = cfg else {
            return Self::default();
        };

        let hsts = sec.enable_hsts.unwrap_or(false).then(|| {
            let max_age = sec.hsts_max_age.unwrap_or(DEFAULT_HSTS_MAX_AGE);
            let include_sub = if sec.hsts_include_subdomains.unwrap_or(false) { "; includeSubDomains" } else { "" };
            HeaderValue::from_str(&format!("max-age={}{}", max_age, include_sub))
                .unwrap_or(HeaderValue::from_static("max-age=31536000"))
        });

        let csp = sec.csp.as_deref().map(str::trim).filter(|c| !c.is_empty()).and_then(|c| {
            HeaderValue::from_str(c)
                .map_err(|e| tracing::warn!("Ignoring invalid security.csp: {}", e))
                .ok()
        });

        Self { hsts, csp }
    }
}

/// Adds the security headers and marks JSON responses as non-cacheable.
pub async fn security_headers_middleware(
    State(sec): State<Arc<SecurityHeaders>>,
    req: Request,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    for (name, value) in STATIC_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    if let Some(hsts) = &sec.hsts {
        headers.insert(HeaderName::from_static("strict-transport-security"), hsts.clone());
    }
    if let Some(csp) = &sec.csp {
        headers.insert(HeaderName::from_static("content-security-policy"), csp.clone());
    }

    // API responses are never cached.
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    res
}
