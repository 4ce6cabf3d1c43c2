//! Binding loaded route modules into the dispatch table.

use std::collections::{hash_map::Entry, HashMap};

use axum::{handler::Handler, http::Method, routing::MethodRouter, Router};
use serde::Serialize;

use super::{
    loader::LoadedUnit,
    transform::{pattern_params, to_axum_path, RoutePattern},
    DiscoveryError,
};

/// Joins the API base path, version and pattern into the full mount path.
///
/// `mount_path("/api", "v1", "/users/:id", "")` is `/api/v1/users/:id`;
/// `mount_path("/api", "v1", "/", "")` is `/api/v1`.
pub fn mount_path(api_base: &str, version: &str, url_pattern: &str, sub_path: &str) -> String {
    let mut path = normalize_base(api_base);
    path.push('/');
    path.push_str(version);
    if url_pattern != "/" {
        path.push_str(url_pattern);
    }
    path.push_str(sub_path);
    path
}

/// `""`, `"/"` → `""`; `"api/"` → `"/api"`.
pub fn normalize_base(api_base: &str) -> String {
    let trimmed = api_base.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Owner reported for paths claimed through [`Registrar::reserve`].
pub const RESERVED_SOURCE: &str = "built-in";

/// A bound method handler.
pub struct RouteRegistration<S> {
    pub method: Method,
    /// Full mount pattern, `:name` syntax.
    pub path: String,
    pub pattern: RoutePattern,
    /// Root-relative path of the module that registered it.
    pub source: String,
    handler: MethodRouter<S>,
}

/// Documentation entry for one registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDoc {
    pub method: String,
    pub path: String,
    pub version: String,
    pub params: Vec<String>,
    pub source: String,
}

/// Collects registrations during the discovery pass.
pub struct Registrar<S> {
    api_base: String,
    entries: Vec<RouteRegistration<S>>,
    index: HashMap<(Method, String), usize>,
    // Path prefix ending in a parameter, with names blanked → the named prefix
    // first registered for it and the entry that introduced it. The dispatcher
    // requires one parameter name per position.
    params: HashMap<String, (String, usize)>,
    // Paths served outside the registry (health, docs). Any method clashes.
    reserved: Vec<String>,
}

impl<S> Registrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: normalize_base(api_base),
            entries: Vec::new(),
            index: HashMap::new(),
            params: HashMap::new(),
            reserved: Vec::new(),
        }
    }

    /// Claims `path` for a handler mounted next to the registry. Modules binding it
    /// fail with [`DiscoveryError::DuplicateRoute`].
    pub fn reserve(&mut self, path: &str) {
        if !self.reserved.iter().any(|p| p == path) {
            self.reserved.push(path.to_string());
        }
    }

    /// Full mount path of a module pattern, without any sub path.
    pub fn mount_path_for(&self, pattern: &RoutePattern) -> String {
        mount_path(&self.api_base, &pattern.version_segment, &pattern.url_pattern, "")
    }

    /// Binds all methods of `unit`. Either every binding is inserted or none is.
    ///
    /// Returns the number of routes added.
    pub fn register(&mut self, pattern: &RoutePattern, unit: LoadedUnit<S>) -> Result<usize, DiscoveryError> {
        let base = self.mount_path_for(pattern);
        let mut pending: Vec<(Method, String)> = Vec::with_capacity(unit.bindings.len());

        for binding in &unit.bindings {
            let path = format!("{}{}", base, binding.sub_path);
            let key = (binding.method.clone(), path.clone());

            if self.reserved.contains(&path) {
                return Err(DiscoveryError::DuplicateRoute {
                    method: binding.method.clone(),
                    pattern: path,
                    existing: RESERVED_SOURCE.to_string(),
                    duplicate: unit.source.clone(),
                });
            }
            if let Some(&existing) = self.index.get(&key) {
                return Err(DiscoveryError::DuplicateRoute {
                    method: binding.method.clone(),
                    pattern: path,
                    existing: self.entries[existing].source.clone(),
                    duplicate: unit.source.clone(),
                });
            }
            if pending.contains(&key) {
                return Err(DiscoveryError::DuplicateRoute {
                    method: binding.method.clone(),
                    pattern: path,
                    existing: unit.source.clone(),
                    duplicate: unit.source.clone(),
                });
            }
            for (shape, prefix) in param_prefixes(&path) {
                if let Some(&(ref seen, existing)) = self.params.get(&shape) {
                    if *seen != prefix {
                        let other = &self.entries[existing];
                        return Err(DiscoveryError::ConflictingParameters {
                            pattern: path,
                            existing_pattern: other.path.clone(),
                            existing: other.source.clone(),
                            duplicate: unit.source.clone(),
                        });
                    }
                }
            }
            pending.push(key);
        }

        // Conflicts between two bindings of the same unit.
        let mut own: HashMap<String, (String, &str)> = HashMap::new();
        for (_, path) in &pending {
            for (shape, prefix) in param_prefixes(path) {
                match own.entry(shape) {
                    Entry::Occupied(seen) if seen.get().0 != prefix => {
                        return Err(DiscoveryError::ConflictingParameters {
                            pattern: path.clone(),
                            existing_pattern: seen.get().1.to_string(),
                            existing: unit.source.clone(),
                            duplicate: unit.source.clone(),
                        });
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(slot) => {
                        slot.insert((prefix, path.as_str()));
                    }
                }
            }
        }

        let added = unit.bindings.len();
        for (binding, (method, path)) in unit.bindings.into_iter().zip(pending) {
            let position = self.entries.len();
            for (shape, prefix) in param_prefixes(&path) {
                self.params.entry(shape).or_insert((prefix, position));
            }
            self.index.insert((method.clone(), path.clone()), position);
            self.entries.push(RouteRegistration {
                method,
                path,
                pattern: pattern.clone(),
                source: unit.source.clone(),
                handler: binding.handler,
            });
        }
        Ok(added)
    }

    /// Ends the discovery pass; no registrations can be added afterwards.
    pub fn freeze(self) -> Registry<S> {
        Registry { entries: self.entries }
    }
}

/// The finished, read-only dispatch table.
pub struct Registry<S> {
    entries: Vec<RouteRegistration<S>>,
}

impl<S> Registry<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Registrations in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = &RouteRegistration<S>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, method: &Method, path: &str) -> Option<&RouteRegistration<S>> {
        self.entries.iter().find(|r| &r.method == method && r.path == path)
    }

    pub fn describe(&self) -> Vec<RouteDoc> {
        self.entries
            .iter()
            .map(|r| RouteDoc {
                method: r.method.to_string(),
                path: r.path.clone(),
                version: r.pattern.version_segment.clone(),
                params: pattern_params(&r.path),
                source: r.source.clone(),
            })
            .collect()
    }

    /// Builds the axum router. Methods sharing a path are merged into one method router.
    pub fn into_router(self) -> Router<S> {
        self.merged()
            .into_iter()
            .fold(Router::new(), |router, (path, handler)| router.route(&to_axum_path(&path), handler))
    }

    /// Like [`Registry::into_router`], but a request whose path matches and whose
    /// method does not is answered by `method_fallback`.
    pub fn into_router_with<H, T>(self, method_fallback: H) -> Router<S>
    where
        H: Handler<T, S> + Clone,
        T: 'static,
    {
        // Fallbacks go on after merging: two method routers with fallbacks cannot merge.
        self.merged().into_iter().fold(Router::new(), |router, (path, handler)| {
            router.route(&to_axum_path(&path), handler.fallback(method_fallback.clone()))
        })
    }

    /// One method router per path, in first-registration order.
    fn merged(self) -> Vec<(String, MethodRouter<S>)> {
        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, MethodRouter<S>> = HashMap::new();

        for entry in self.entries {
            let handler = match merged.remove(&entry.path) {
                Some(existing) => existing.merge(entry.handler),
                None => {
                    order.push(entry.path.clone());
                    entry.handler
                }
            };
            merged.insert(entry.path, handler);
        }

        order.into_iter().filter_map(|path| merged.remove(&path).map(|handler| (path, handler))).collect()
    }
}

/// For every parameter segment: (prefix with names blanked, prefix as written).
///
/// `/a/:x/b/:y` → `[("/a/:", "/a/:x"), ("/a/:/b/:", "/a/:x/b/:y")]`.
fn param_prefixes(path: &str) -> Vec<(String, String)> {
    let mut shape = String::new();
    let mut concrete = String::new();
    let mut out = Vec::new();
    for (i, seg) in path.split('/').enumerate() {
        if i > 0 {
            shape.push('/');
            concrete.push('/');
        }
        concrete.push_str(seg);
        if seg.starts_with(':') {
            shape.push(':');
            out.push((shape.clone(), concrete.clone()));
        } else {
            shape.push_str(seg);
        }
    }
    out
}
