//! Deterministic enumeration of the route-source tree.
//!
//! Entries are visited depth-first with siblings sorted byte-wise by file name,
//! so the same tree always yields the same candidate sequence.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use super::DiscoveryError;

/// Filters applied while walking.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Allowed file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Globs matched against root-relative paths (`/`-separated).
    pub excludes: Vec<String>,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { extensions: vec!["rs".to_string()], excludes: Vec::new(), include_hidden: false, follow_symlinks: false }
    }
}

/// A file eligible for transformation and loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub full_path: PathBuf,
    /// Path components relative to the walk root; the last one is the file name.
    pub relative_segments: Vec<String>,
}

impl CandidateFile {
    /// `/`-joined relative path, e.g. `v1/users/[id].rs`.
    pub fn relative_key(&self) -> String {
        self.relative_segments.join("/")
    }
}

/// An entry that could not be walked. The walk continues after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Walks one route root. Cheap to clone; every call to [`Walker::candidates`] starts over.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    extensions: Vec<String>,
    excludes: Arc<GlobSet>,
    include_hidden: bool,
    follow_symlinks: bool,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, options: &WalkOptions) -> Result<Self, DiscoveryError> {
        Ok(Self {
            root: root.into(),
            extensions: options.extensions.iter().map(|e| e.trim_start_matches('.').to_string()).collect(),
            excludes: Arc::new(build_globset(&options.excludes)?),
            include_hidden: options.include_hidden,
            follow_symlinks: options.follow_symlinks,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a walk. Fails only if the root itself cannot be opened.
    pub fn candidates(&self) -> Result<Candidates, DiscoveryError> {
        fs::read_dir(&self.root)
            .map_err(|source| DiscoveryError::DirectoryUnavailable { path: self.root.clone(), source })?;

        let root = self.root.clone();
        let excludes = Arc::clone(&self.excludes);
        let include_hidden = self.include_hidden;
        let keep: EntryFilter = Box::new(move |entry: &DirEntry| {
            // The root is always walked, whatever its name.
            if entry.depth() == 0 {
                return true;
            }
            if !include_hidden && is_hidden(entry) {
                return false;
            }
            match relative_slash_path(&root, entry.path()) {
                Some(rel) => !excludes.is_match(rel),
                None => true,
            }
        });

        let inner = WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .sort_by(|a, b| a.file_name().as_encoded_bytes().cmp(b.file_name().as_encoded_bytes()))
            .into_iter()
            .filter_entry(keep);

        Ok(Candidates { inner, root: self.root.clone(), extensions: self.extensions.clone() })
    }

    fn accepts_extension(extensions: &[String], path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()).is_some_and(|ext| extensions.iter().any(|a| a == ext))
    }
}

type EntryFilter = Box<dyn FnMut(&DirEntry) -> bool + Send>;

/// Lazy candidate sequence produced by [`Walker::candidates`].
pub struct Candidates {
    inner: walkdir::FilterEntry<walkdir::IntoIter, EntryFilter>,
    root: PathBuf,
    extensions: Vec<String>,
}

impl Iterator for Candidates {
    type Item = Result<CandidateFile, WalkFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    return Some(Err(WalkFailure { path, reason: err.to_string() }));
                }
            };

            // Directories, symlinks that are not followed, sockets, fifos...
            if !entry.file_type().is_file() {
                continue;
            }
            if !Walker::accepts_extension(&self.extensions, entry.path()) {
                continue;
            }

            return Some(match relative_segments(&self.root, entry.path()) {
                Some(relative_segments) => {
                    Ok(CandidateFile { full_path: entry.into_path(), relative_segments })
                }
                None => Err(WalkFailure {
                    path: entry.into_path(),
                    reason: "path is not valid UTF-8".to_string(),
                }),
            });
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| DiscoveryError::InvalidExclude { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| DiscoveryError::InvalidExclude { pattern: patterns.join(", "), source })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}

fn relative_segments(root: &Path, path: &Path) -> Option<Vec<String>> {
    path.strip_prefix(root)
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect()
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    relative_segments(root, path).map(|segments| segments.join("/"))
}
