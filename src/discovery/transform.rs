//! File path → URL pattern.
//!
//! Route files live below one directory per API version. Everything below the
//! version directory encodes the URL:
//!
//! | file (below `v1/`)       | pattern          | params        |
//! |--------------------------|------------------|---------------|
//! | `index.rs`               | `/`              |               |
//! | `users/index.rs`         | `/users`         |               |
//! | `users/[id].rs`          | `/users/:id`     | `id`          |
//! | `a/[x]/b/[y].rs`         | `/a/:x/b/:y`     | `x`, `y`      |
//!
//! Everything here is pure string work; nothing touches the filesystem.

use serde::Serialize;
use thiserror::Error;

/// Segment that is elided from the URL.
const INDEX_SEGMENT: &str = "index";

/// The routing information derived from one route file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePattern {
    /// URL template below the version, always starting with `/` (e.g. `/users/:id`).
    pub url_pattern: String,
    /// Name of the enclosing version directory (e.g. `v1`).
    pub version_segment: String,
    /// Names of the bracket segments, left to right.
    pub dynamic_param_names: Vec<String>,
}

/// Reasons a path cannot be turned into a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("route file is not inside a version directory")]
    OutsideVersionDirectory,
    #[error("invalid version directory name '{segment}'")]
    InvalidVersionSegment { segment: String },
    #[error("empty parameter name in segment {position}")]
    EmptyParamName { position: usize },
    #[error("malformed path segment '{segment}'")]
    MalformedSegment { segment: String },
    #[error("parameter '{name}' appears more than once")]
    DuplicateParamName { name: String },
}

/// Transforms the root-relative segments of a route file into a [`RoutePattern`].
///
/// `segments[0]` is the version directory, the last element is the file name
/// including its extension.
pub fn transform<T: AsRef<str>>(segments: &[T]) -> Result<RoutePattern, TransformError> {
    let (version, below) = match segments {
        [version, below @ ..] if !below.is_empty() => (version.as_ref(), below),
        _ => return Err(TransformError::OutsideVersionDirectory),
    };
    validate_version(version)?;

    let (url_pattern, dynamic_param_names) = url_pattern(below)?;
    Ok(RoutePattern { url_pattern, version_segment: version.to_string(), dynamic_param_names })
}

/// Builds the URL template for the segments below the version directory.
///
/// The last segment is treated as a file name; only its final extension is dropped.
pub fn url_pattern<T: AsRef<str>>(segments: &[T]) -> Result<(String, Vec<String>), TransformError> {
    let last = segments.len().saturating_sub(1);
    let mut parts: Vec<String> = Vec::with_capacity(segments.len());
    let mut params: Vec<String> = Vec::new();

    for (position, raw) in segments.iter().enumerate() {
        let raw = raw.as_ref();
        let segment = if position == last { strip_extension(raw) } else { raw };

        match classify(segment, position)? {
            Segment::Elided => {}
            Segment::Literal(lit) => parts.push(lit.to_string()),
            Segment::Param(name) => {
                if params.iter().any(|p| p == name) {
                    return Err(TransformError::DuplicateParamName { name: name.to_string() });
                }
                parts.push(format!(":{}", name));
                params.push(name.to_string());
            }
        }
    }

    Ok((format!("/{}", parts.join("/")), params))
}

/// Rewrites `:name` segments into the `{name}` capture syntax axum expects.
pub fn to_axum_path(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => seg.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parameter names of a full pattern (`/api/v1/users/:id` → `["id"]`).
pub fn pattern_params(pattern: &str) -> Vec<String> {
    pattern.split('/').filter_map(|seg| seg.strip_prefix(':')).map(str::to_string).collect()
}

enum Segment<'a> {
    Elided,
    Literal(&'a str),
    Param(&'a str),
}

fn classify(segment: &str, position: usize) -> Result<Segment<'_>, TransformError> {
    if segment.is_empty() || segment == INDEX_SEGMENT {
        return Ok(Segment::Elided);
    }

    if let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if inner.is_empty() {
            return Err(TransformError::EmptyParamName { position });
        }
        if inner.chars().any(is_reserved_in_name) {
            return Err(malformed(segment));
        }
        return Ok(Segment::Param(inner));
    }

    // Stray brackets, or characters the dispatcher would read as captures.
    if segment.contains(&['[', ']', '{', '}'][..]) || segment.starts_with(&[':', '*'][..]) {
        return Err(malformed(segment));
    }
    Ok(Segment::Literal(segment))
}

fn validate_version(version: &str) -> Result<(), TransformError> {
    let invalid = version.is_empty()
        || version == INDEX_SEGMENT
        || version.contains(&['[', ']', '{', '}'][..])
        || version.starts_with(&[':', '*'][..]);
    if invalid {
        return Err(TransformError::InvalidVersionSegment { segment: version.to_string() });
    }
    Ok(())
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        // A leading dot is part of the name, not an extension separator.
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

fn is_reserved_in_name(c: char) -> bool {
    matches!(c, '[' | ']' | '{' | '}' | ':' | '*' | '/')
}

fn malformed(segment: &str) -> TransformError {
    TransformError::MalformedSegment { segment: segment.to_string() }
}
