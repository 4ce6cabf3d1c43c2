//! Build-time generation of the module catalog.
//!
//! Walks a route tree exactly like a discovery pass does, checks every route
//! file for a usable `register` export and emits Rust source that declares each
//! file as a module and lists it in a [`ModuleCatalog`](crate::discovery::ModuleCatalog).
//! Meant to be called from a consumer's `build.rs`:
//!
//! ```no_run
//! // build.rs
//! use pfadfinder::codegen::{write_catalog, CodegenOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let out = std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("routes.rs");
//!     let options = CodegenOptions::new("crate::state::AppState");
//!     write_catalog("api", &options, &out)?;
//!     println!("cargo:rerun-if-changed=api");
//!     Ok(())
//! }
//! ```
//!
//! and `include!(concat!(env!("OUT_DIR"), "/routes.rs"));` wherever `catalog()` is wanted.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use syn::{Item, UseTree, Visibility};

use crate::discovery::{
    transform, DiagnosticRecord, DiscoveryError, LoadFailure, Stage, WalkOptions, Walker,
};

/// Name of the function a route file must export.
pub const REGISTER_FN: &str = "register";

/// Settings for the emitted source.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Type path of the router state the catalog is built for.
    pub state_type: String,
    /// Path under which the `pfadfinder` crate is reachable from the generated code.
    pub crate_path: String,
    pub walk: WalkOptions,
}

impl CodegenOptions {
    pub fn new(state_type: impl Into<String>) -> Self {
        Self { state_type: state_type.into(), crate_path: "::pfadfinder".to_string(), walk: WalkOptions::default() }
    }

    pub fn with_crate_path(mut self, crate_path: impl Into<String>) -> Self {
        self.crate_path = crate_path.into();
        self
    }

    pub fn with_walk(mut self, walk: WalkOptions) -> Self {
        self.walk = walk;
        self
    }
}

/// Generated catalog source and what happened to each file.
#[derive(Debug, Clone)]
pub struct GeneratedCatalog {
    pub source: String,
    /// Modules listed with a callable export.
    pub modules: usize,
    /// Modules listed as invalid.
    pub rejected: usize,
    pub diagnostics: Vec<DiagnosticRecord>,
}

/// Checks that `source` exports a usable `register` function.
pub fn inspect_source(source: &str) -> Result<(), LoadFailure> {
    let file = syn::parse_file(source).map_err(|e| LoadFailure::SourceError { reason: e.to_string() })?;

    for item in &file.items {
        match item {
            Item::Fn(f) if f.sig.ident == REGISTER_FN => {
                if !matches!(f.vis, Visibility::Public(_)) {
                    return Err(LoadFailure::MissingExport);
                }
                if f.sig.asyncness.is_some() {
                    return Err(LoadFailure::InvalidSignature { reason: "function must not be async".to_string() });
                }
                if f.sig.inputs.len() != 1 {
                    return Err(LoadFailure::InvalidSignature {
                        reason: format!("expected one parameter, found {}", f.sig.inputs.len()),
                    });
                }
                return Ok(());
            }
            Item::Use(u) if use_exports_register(&u.tree) => {
                return if matches!(u.vis, Visibility::Public(_)) { Ok(()) } else { Err(LoadFailure::MissingExport) };
            }
            other => {
                if let Some(kind) = non_callable_kind(other) {
                    return Err(LoadFailure::NotCallable { kind: kind.to_string() });
                }
            }
        }
    }
    Err(LoadFailure::MissingExport)
}

/// Reads and inspects one route file.
pub fn inspect_file(path: &Path) -> Result<(), LoadFailure> {
    let source = fs::read_to_string(path).map_err(|e| LoadFailure::SourceError { reason: e.to_string() })?;
    inspect_source(&source)
}

/// Generates the catalog source for the tree under `root`.
pub fn generate_catalog(root: impl AsRef<Path>, options: &CodegenOptions) -> Result<GeneratedCatalog, DiscoveryError> {
    let root = root.as_ref();
    let walker = Walker::new(root, &options.walk)?;
    let krate = &options.crate_path;

    let mut decls = String::new();
    let mut entries = String::new();
    let mut diagnostics = Vec::new();
    let mut modules = 0usize;
    let mut rejected = 0usize;

    for (idx, item) in walker.candidates()?.enumerate() {
        let candidate = match item {
            Ok(candidate) => candidate,
            Err(failure) => {
                diagnostics.push(DiagnosticRecord::failure(
                    failure.path.display().to_string(),
                    Stage::Walk,
                    failure.reason,
                ));
                continue;
            }
        };
        let key = candidate.relative_key();

        let pattern = match transform(&candidate.relative_segments) {
            Ok(pattern) => pattern,
            Err(err) => {
                diagnostics.push(DiagnosticRecord::failure(key, Stage::Transform, err));
                continue;
            }
        };
        let shown = format!("/{}{}", pattern.version_segment, pattern.url_pattern.trim_end_matches('/'));

        match inspect_file(&candidate.full_path) {
            Ok(()) => {
                let ident = module_ident(idx, &candidate.relative_segments);
                let full_path = absolute(&candidate.full_path);
                let _ = writeln!(decls, "#[path = {:?}]\nmod {};", full_path.display().to_string(), ident);
                let _ = writeln!(entries, "        // {}\n        .module({:?}, {}::{})", shown, key, ident, REGISTER_FN);
                diagnostics.push(DiagnosticRecord::success(key, shown));
                modules += 1;
            }
            Err(reason) => {
                let _ = writeln!(
                    entries,
                    "        .invalid({:?}, {}::discovery::LoadFailure::{})",
                    key,
                    krate,
                    failure_expr(&reason)
                );
                diagnostics.push(DiagnosticRecord::failure(key, Stage::Load, &reason).with_pattern(shown));
                rejected += 1;
            }
        }
    }

    let mut source = String::new();
    let _ = writeln!(source, "// @generated by pfadfinder::codegen from {:?}. Do not edit.\n", root.display().to_string());
    source.push_str(&decls);
    let _ = writeln!(source);
    let _ = writeln!(source, "pub fn catalog() -> {}::discovery::ModuleCatalog<{}> {{", krate, options.state_type);
    let _ = writeln!(source, "    {}::discovery::ModuleCatalog::new()", krate);
    source.push_str(&entries);
    let _ = writeln!(source, "}}");

    Ok(GeneratedCatalog { source, modules, rejected, diagnostics })
}

/// Writes the generated catalog to `out_file`, leaving it untouched if nothing changed.
pub fn write_catalog(
    root: impl AsRef<Path>,
    options: &CodegenOptions,
    out_file: impl AsRef<Path>,
) -> anyhow::Result<GeneratedCatalog> {
    let generated = generate_catalog(root, options)?;
    let out_file = out_file.as_ref();
    let current = fs::read_to_string(out_file).ok();
    if current.as_deref() != Some(generated.source.as_str()) {
        if let Some(parent) = out_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(out_file, &generated.source)?;
    }
    Ok(generated)
}

fn use_exports_register(tree: &UseTree) -> bool {
    match tree {
        UseTree::Path(p) => use_exports_register(&p.tree),
        UseTree::Name(n) => n.ident == REGISTER_FN,
        UseTree::Rename(r) => r.rename == REGISTER_FN,
        UseTree::Group(g) => g.items.iter().any(use_exports_register),
        UseTree::Glob(_) => false,
    }
}

fn non_callable_kind(item: &Item) -> Option<&'static str> {
    match item {
        Item::Const(c) if c.ident == REGISTER_FN => Some("const"),
        Item::Static(s) if s.ident == REGISTER_FN => Some("static"),
        Item::Struct(s) if s.ident == REGISTER_FN => Some("struct"),
        Item::Enum(e) if e.ident == REGISTER_FN => Some("enum"),
        Item::Type(t) if t.ident == REGISTER_FN => Some("type alias"),
        Item::Mod(m) if m.ident == REGISTER_FN => Some("module"),
        _ => None,
    }
}

fn failure_expr(reason: &LoadFailure) -> String {
    match reason {
        LoadFailure::MissingExport => "MissingExport".to_string(),
        LoadFailure::NoHandlers => "NoHandlers".to_string(),
        LoadFailure::NotCallable { kind } => format!("NotCallable {{ kind: String::from({:?}) }}", kind),
        LoadFailure::InvalidSignature { reason } => {
            format!("InvalidSignature {{ reason: String::from({:?}) }}", reason)
        }
        LoadFailure::SourceError { reason } => format!("SourceError {{ reason: String::from({:?}) }}", reason),
        LoadFailure::SetupFailed { reason } => format!("SetupFailed {{ reason: String::from({:?}) }}", reason),
        LoadFailure::Panicked { message } => format!("Panicked {{ message: String::from({:?}) }}", message),
        LoadFailure::InvalidBinding { reason } => {
            format!("InvalidBinding {{ reason: String::from({:?}) }}", reason)
        }
    }
}

/// `route_003_v1_users_id` for `v1/users/[id].rs`.
fn module_ident(idx: usize, segments: &[String]) -> String {
    let mut ident = format!("route_{:03}", idx);
    for segment in segments {
        let stem = segment.rsplit_once('.').map_or(segment.as_str(), |(stem, _)| stem);
        let cleaned: String =
            stem.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' }).collect();
        let cleaned = cleaned.trim_matches('_');
        if !cleaned.is_empty() {
            ident.push('_');
            ident.push_str(cleaned);
        }
    }
    ident
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
