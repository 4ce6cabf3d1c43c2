//! Route modules and how they are loaded.
//!
//! A route file exposes a handler-registration unit: a `register` function that
//! receives a [`RouteContext`] and attaches handlers to it. Modules are not
//! resolved from paths at run time; they are listed in a [`ModuleCatalog`]
//! (hand-written, or emitted by [`crate::codegen`]) keyed by the file's
//! root-relative path. The loader looks the candidate up and runs its unit in
//! isolation; whatever goes wrong ends up as a [`LoadOutcome::Failed`].

use std::{
    any::Any,
    collections::BTreeMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    sync::Arc,
};

use axum::{
    handler::Handler,
    http::Method,
    routing::{on, MethodFilter, MethodRouter},
};
use thiserror::Error;

use super::{transform::RoutePattern, walker::CandidateFile};

/// Why a module could not be loaded. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error("module does not export a `register` function")]
    MissingExport,
    #[error("`register` is a {kind}, not a function")]
    NotCallable { kind: String },
    #[error("`register` has an unsupported signature: {reason}")]
    InvalidSignature { reason: String },
    #[error("module source could not be loaded: {reason}")]
    SourceError { reason: String },
    #[error("register returned an error: {reason}")]
    SetupFailed { reason: String },
    #[error("register panicked: {message}")]
    Panicked { message: String },
    #[error("invalid handler binding: {reason}")]
    InvalidBinding { reason: String },
    #[error("register attached no handlers")]
    NoHandlers,
}

/// One method bound by a route module, relative to the module's pattern.
pub struct MethodBinding<S> {
    pub method: Method,
    /// Empty, or a `/`-prefixed suffix appended to the module's pattern.
    pub sub_path: String,
    pub(crate) handler: MethodRouter<S>,
}

impl<S> fmt::Debug for MethodBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBinding").field("method", &self.method).field("sub_path", &self.sub_path).finish()
    }
}

/// The router context handed to a handler-registration unit.
pub struct RouteContext<S> {
    bindings: Vec<MethodBinding<S>>,
    errors: Vec<String>,
    // Parameters already bound by the file path.
    params: Vec<String>,
}

impl<S> Default for RouteContext<S> {
    fn default() -> Self {
        Self { bindings: Vec::new(), errors: Vec::new(), params: Vec::new() }
    }
}

impl<S> RouteContext<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a module mounted at `pattern`; sub paths may not reuse its parameter names.
    pub fn for_pattern(pattern: &RoutePattern) -> Self {
        Self { params: pattern.dynamic_param_names.clone(), ..Self::default() }
    }

    pub fn get<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.on(Method::GET, handler)
    }

    pub fn post<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.on(Method::POST, handler)
    }

    pub fn put<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.on(Method::PUT, handler)
    }

    pub fn patch<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.on(Method::PATCH, handler)
    }

    pub fn delete<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.on(Method::DELETE, handler)
    }

    /// Binds `handler` for `method` at the module's own pattern.
    pub fn on<H, T>(&mut self, method: Method, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.on_path(method, "", handler)
    }

    /// Binds `handler` for `method` at the module's pattern plus `sub_path`
    /// (e.g. `/avatar` or `/:size`).
    pub fn on_path<H, T>(&mut self, method: Method, sub_path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        if let Err(reason) = validate_sub_path(sub_path, &self.params) {
            self.errors.push(reason);
            return self;
        }
        let filter = match MethodFilter::try_from(method.clone()) {
            Ok(filter) => filter,
            Err(_) => {
                self.errors.push(format!("method {} cannot be routed", method));
                return self;
            }
        };
        self.bindings.push(MethodBinding { method, sub_path: sub_path.to_string(), handler: on(filter, handler) });
        self
    }

    pub fn bindings(&self) -> &[MethodBinding<S>] {
        &self.bindings
    }
}

fn validate_sub_path(sub_path: &str, bound: &[String]) -> Result<(), String> {
    if sub_path.is_empty() {
        return Ok(());
    }
    let rest = sub_path.strip_prefix('/').ok_or_else(|| format!("sub path '{}' must start with '/'", sub_path))?;
    let mut seen: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        let param = segment.strip_prefix(':');
        let name = param.unwrap_or(segment);
        let bad = name.is_empty() || name.contains(&['[', ']', '{', '}', '*', ':'][..]);
        if bad {
            return Err(format!("invalid segment '{}' in sub path '{}'", segment, sub_path));
        }
        if let Some(param) = param {
            if seen.contains(&param) || bound.iter().any(|b| b == param) {
                return Err(format!("parameter '{}' in sub path '{}' is already bound", param, sub_path));
            }
            seen.push(param);
        }
    }
    Ok(())
}

/// A handler-registration unit.
pub type HandlerUnit<S> = Arc<dyn Fn(&mut RouteContext<S>) -> anyhow::Result<()> + Send + Sync>;

/// What a catalog knows about a module's export.
pub enum ModuleExport<S> {
    Register(HandlerUnit<S>),
    /// The export was inspected at build time and rejected.
    Invalid(LoadFailure),
}

/// Manifest of route modules keyed by root-relative path (`v1/users/[id].rs`).
pub struct ModuleCatalog<S> {
    modules: BTreeMap<String, ModuleExport<S>>,
}

impl<S> Default for ModuleCatalog<S> {
    fn default() -> Self {
        Self { modules: BTreeMap::new() }
    }
}

impl<S> ModuleCatalog<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists a module whose `register` function is `unit`.
    pub fn module<F>(mut self, key: impl Into<String>, unit: F) -> Self
    where
        F: Fn(&mut RouteContext<S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.modules.insert(key.into(), ModuleExport::Register(Arc::new(unit)));
        self
    }

    /// Lists a module whose export has the wrong shape.
    pub fn invalid(mut self, key: impl Into<String>, reason: LoadFailure) -> Self {
        self.modules.insert(key.into(), ModuleExport::Invalid(reason));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ModuleExport<S>> {
        self.modules.get(key)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The bindings a module attached while registering.
pub struct LoadedUnit<S> {
    pub source: String,
    pub bindings: Vec<MethodBinding<S>>,
}

/// Result of loading one candidate.
pub enum LoadOutcome<S> {
    Loaded { unit: LoadedUnit<S> },
    Failed { path: PathBuf, reason: LoadFailure },
}

impl<S> fmt::Debug for LoadOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Loaded { unit } => f
                .debug_struct("Loaded")
                .field("source", &unit.source)
                .field("bindings", &unit.bindings)
                .finish(),
            LoadOutcome::Failed { path, reason } => {
                f.debug_struct("Failed").field("path", path).field("reason", reason).finish()
            }
        }
    }
}

/// Turns a candidate file into its registered handlers.
pub trait ModuleLoader<S> {
    /// `pattern` is what the transform derived for `candidate`.
    fn load(&self, candidate: &CandidateFile, pattern: &RoutePattern) -> LoadOutcome<S>;
}

/// Loads modules from a [`ModuleCatalog`].
pub struct CatalogLoader<'a, S> {
    catalog: &'a ModuleCatalog<S>,
}

impl<'a, S> CatalogLoader<'a, S> {
    pub fn new(catalog: &'a ModuleCatalog<S>) -> Self {
        Self { catalog }
    }
}

impl<S> ModuleLoader<S> for CatalogLoader<'_, S>
where
    S: Clone + Send + Sync + 'static,
{
    fn load(&self, candidate: &CandidateFile, pattern: &RoutePattern) -> LoadOutcome<S> {
        let key = candidate.relative_key();
        let failed = |reason| LoadOutcome::Failed { path: candidate.full_path.clone(), reason };

        let unit = match self.catalog.get(&key) {
            Some(ModuleExport::Register(unit)) => Arc::clone(unit),
            Some(ModuleExport::Invalid(reason)) => return failed(reason.clone()),
            None => return failed(LoadFailure::MissingExport),
        };

        let mut ctx = RouteContext::for_pattern(pattern);
        match panic::catch_unwind(AssertUnwindSafe(|| unit(&mut ctx))) {
            Err(payload) => failed(LoadFailure::Panicked { message: panic_message(payload.as_ref()) }),
            Ok(Err(err)) => failed(LoadFailure::SetupFailed { reason: format!("{:#}", err) }),
            Ok(Ok(())) if !ctx.errors.is_empty() => {
                failed(LoadFailure::InvalidBinding { reason: ctx.errors.join("; ") })
            }
            Ok(Ok(())) if ctx.bindings.is_empty() => failed(LoadFailure::NoHandlers),
            Ok(Ok(())) => LoadOutcome::Loaded { unit: LoadedUnit { source: key, bindings: ctx.bindings } },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
