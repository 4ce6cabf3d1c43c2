//! Convention-based route discovery.
//!
//! A discovery pass walks the route root, turns every candidate file into a
//! [`RoutePattern`], loads the module listed for it and binds its handlers into
//! a [`Registry`]:
//!
//! ```text
//! Idle → Walking → (Transforming → Loading → Registering)* → Complete
//!                                                          ↘ FatalAborted
//! ```
//!
//! Files that fail to transform or load are reported and skipped. A missing
//! root directory and colliding routes abort the pass.
//!
//! ```no_run
//! use pfadfinder::discovery::{discover, CatalogLoader, DiscoveryOptions, ModuleCatalog, RouteContext, TracingReporter};
//!
//! fn users(ctx: &mut RouteContext<()>) -> anyhow::Result<()> {
//!     ctx.get(|| async { "[]" });
//!     Ok(())
//! }
//!
//! let catalog = ModuleCatalog::new().module("v1/users/index.rs", users);
//! let options = DiscoveryOptions::new("api").with_api_base("/api");
//! let output = discover(&options, &CatalogLoader::new(&catalog), &mut TracingReporter)?;
//! let app: axum::Router = output.registry.into_router();
//! # Ok::<(), pfadfinder::discovery::DiscoveryError>(())
//! ```

use std::path::PathBuf;

use axum::http::Method;
use thiserror::Error;
use tracing::{debug, info};

pub mod loader;
pub mod registrar;
pub mod report;
pub mod transform;
pub mod walker;

pub use loader::{
    CatalogLoader, HandlerUnit, LoadFailure, LoadOutcome, LoadedUnit, MethodBinding, ModuleCatalog, ModuleExport,
    ModuleLoader, RouteContext,
};
pub use registrar::{mount_path, Registrar, Registry, RouteDoc, RouteRegistration, RESERVED_SOURCE};
pub use report::{DiagnosticRecord, MemoryReporter, Outcome, Reporter, Stage, Tee, TracingReporter};
pub use transform::{transform, RoutePattern, TransformError};
pub use walker::{CandidateFile, Candidates, WalkFailure, WalkOptions, Walker};

use crate::config::RoutesConfig;

/// Errors that end a discovery pass.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("route directory {path} is unavailable: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("duplicate route {method} {pattern}: defined by {existing} and {duplicate}")]
    DuplicateRoute { method: Method, pattern: String, existing: String, duplicate: String },
    #[error(
        "route {pattern} from {duplicate} names its parameters differently than {existing_pattern} from {existing}"
    )]
    ConflictingParameters { pattern: String, existing_pattern: String, existing: String, duplicate: String },
}

impl DiscoveryError {
    /// Whether the error was raised while binding routes (as opposed to walking).
    pub fn is_registration_conflict(&self) -> bool {
        matches!(self, DiscoveryError::DuplicateRoute { .. } | DiscoveryError::ConflictingParameters { .. })
    }
}

/// Where a discovery pass currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Idle,
    Walking,
    Transforming,
    Loading,
    Registering,
    Complete,
    FatalAborted,
}

/// Inputs of a discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub root: PathBuf,
    /// Prefix placed before the version segment (e.g. `/api`).
    pub api_base: String,
    pub walk: WalkOptions,
    /// Full paths served next to the discovered routes; modules may not bind them.
    pub reserved: Vec<String>,
}

impl DiscoveryOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), api_base: String::new(), walk: WalkOptions::default(), reserved: Vec::new() }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_walk(mut self, walk: WalkOptions) -> Self {
        self.walk = walk;
        self
    }

    pub fn with_reserved<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.reserved.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn from_config(cfg: &RoutesConfig) -> Self {
        Self {
            root: PathBuf::from(&cfg.dir),
            api_base: cfg.api_base.clone(),
            walk: WalkOptions {
                extensions: cfg.extensions.clone(),
                excludes: cfg.excludes.clone(),
                include_hidden: cfg.include_hidden,
                follow_symlinks: cfg.follow_symlinks,
            },
            reserved: Vec::new(),
        }
    }
}

/// Counters of a finished pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySummary {
    /// Files that reached the pipeline, plus entries that failed to walk.
    pub candidates: usize,
    pub loaded: usize,
    pub failed: usize,
    pub routes: usize,
}

/// The frozen registry plus counters.
pub struct DiscoveryOutput<S> {
    pub registry: Registry<S>,
    pub summary: DiscoverySummary,
}

/// Drives one discovery pass.
#[derive(Debug)]
pub struct Discovery {
    options: DiscoveryOptions,
    state: DiscoveryState,
}

impl Discovery {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options, state: DiscoveryState::Idle }
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    fn enter(&mut self, state: DiscoveryState) {
        debug!(from = ?self.state, to = ?state, "discovery state");
        self.state = state;
    }

    /// Runs the pass. Candidates are processed one at a time in walk order.
    pub fn run<S, L, R>(&mut self, loader: &L, reporter: &mut R) -> Result<DiscoveryOutput<S>, DiscoveryError>
    where
        S: Clone + Send + Sync + 'static,
        L: ModuleLoader<S> + ?Sized,
        R: Reporter + ?Sized,
    {
        match self.walk(loader, reporter) {
            Ok(output) => {
                self.enter(DiscoveryState::Complete);
                let s = output.summary;
                info!(
                    root = %self.options.root.display(),
                    candidates = s.candidates,
                    loaded = s.loaded,
                    failed = s.failed,
                    routes = s.routes,
                    "route discovery complete"
                );
                Ok(output)
            }
            Err(err) => {
                self.enter(DiscoveryState::FatalAborted);
                Err(err)
            }
        }
    }

    fn walk<S, L, R>(&mut self, loader: &L, reporter: &mut R) -> Result<DiscoveryOutput<S>, DiscoveryError>
    where
        S: Clone + Send + Sync + 'static,
        L: ModuleLoader<S> + ?Sized,
        R: Reporter + ?Sized,
    {
        let walker = Walker::new(&self.options.root, &self.options.walk)?;
        let candidates = walker.candidates()?;
        self.enter(DiscoveryState::Walking);

        let mut registrar = Registrar::new(&self.options.api_base);
        for path in &self.options.reserved {
            registrar.reserve(path);
        }
        let mut summary = DiscoverySummary::default();

        for item in candidates {
            summary.candidates += 1;
            let candidate = match item {
                Ok(candidate) => candidate,
                Err(failure) => {
                    summary.failed += 1;
                    reporter.record(DiagnosticRecord::failure(
                        failure.path.display().to_string(),
                        Stage::Walk,
                        failure.reason,
                    ));
                    continue;
                }
            };
            let key = candidate.relative_key();

            self.enter(DiscoveryState::Transforming);
            let pattern = match transform(&candidate.relative_segments) {
                Ok(pattern) => pattern,
                Err(err) => {
                    summary.failed += 1;
                    reporter.record(DiagnosticRecord::failure(key, Stage::Transform, err));
                    self.enter(DiscoveryState::Walking);
                    continue;
                }
            };
            let mount = registrar.mount_path_for(&pattern);

            self.enter(DiscoveryState::Loading);
            let unit = match loader.load(&candidate, &pattern) {
                LoadOutcome::Loaded { unit } => unit,
                LoadOutcome::Failed { reason, .. } => {
                    summary.failed += 1;
                    reporter.record(DiagnosticRecord::failure(key, Stage::Load, reason).with_pattern(mount));
                    self.enter(DiscoveryState::Walking);
                    continue;
                }
            };

            self.enter(DiscoveryState::Registering);
            match registrar.register(&pattern, unit) {
                Ok(added) => {
                    summary.loaded += 1;
                    summary.routes += added;
                    reporter.record(DiagnosticRecord::success(key, mount));
                }
                Err(err) => {
                    reporter.record(DiagnosticRecord::failure(key, Stage::Register, &err).with_pattern(mount));
                    return Err(err);
                }
            }
            self.enter(DiscoveryState::Walking);
        }

        Ok(DiscoveryOutput { registry: registrar.freeze(), summary })
    }
}

/// Runs a single discovery pass with `options`.
pub fn discover<S, L, R>(
    options: &DiscoveryOptions,
    loader: &L,
    reporter: &mut R,
) -> Result<DiscoveryOutput<S>, DiscoveryError>
where
    S: Clone + Send + Sync + 'static,
    L: ModuleLoader<S> + ?Sized,
    R: Reporter + ?Sized,
{
    Discovery::new(options.clone()).run(loader, reporter)
}
