//! Unit and integration tests for Pfadfinder.
//!
//! ## Test Modules
//!
//! - **transform_tests**: file path to URL pattern rules
//! - **walker_tests**: ordering and filtering of the route tree walk
//! - **loader_tests**: catalog lookup and isolation of registration units
//! - **registrar_tests**: mount paths, collisions and the built router
//! - **discovery_tests**: full passes over temporary route trees
//! - **codegen_tests**: export inspection and catalog generation
//! - **config_tests**: configuration defaults, overrides and validation
//! - **error_tests**: error envelope and conversions
//! - **api_tests**: the assembled server with built-in endpoints and middleware
//!
//! Individual modules can be run with:
//! ```bash
//! cargo test walker_tests
//! ```

pub mod error_tests;
pub mod loader_tests;
pub mod walker_tests;

/// Shared fixtures.
#[cfg(test)]
pub(crate) mod support {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    /// Creates `files` (root-relative, `/`-separated) below a fresh temp dir.
    pub fn route_tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            touch(dir.path(), file);
        }
        dir
    }

    pub fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "pub fn register(_ctx: &mut Ctx) -> Result<()> { Ok(()) }\n").unwrap();
    }
}
