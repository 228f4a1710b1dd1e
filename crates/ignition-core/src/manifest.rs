//! # Dynamic Module Loader
//!
//! Discovers `modules.toml` manifests across the configured search paths and
//! appends the modules they name to the catalogue. Discovery order is
//! deterministic: search paths in configured order, directory entries in
//! lexicographic order, depth first. Within one manifest, identifiers keep
//! file order.
//!
//! Every failure on this path is fatal: an unreadable path, a malformed
//! manifest, or an identifier with no registered constructor aborts the
//! bootstrap before graph construction is attempted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::BootstrapError;
use crate::module::ModuleSet;
use crate::registry::ModuleRegistry;

/// Fixed manifest file name looked for across the search paths.
pub const MODULE_MANIFEST_NAME: &str = "modules.toml";

/// On-disk manifest shape. Unrecognized keys are ignored.
#[derive(Debug, Deserialize)]
struct ModuleManifest {
    #[serde(default)]
    modules: Vec<String>,
}

/// Discover every `modules.toml` under the search paths, in deterministic
/// order.
pub fn discover_manifests(search_paths: &[PathBuf]) -> Result<Vec<PathBuf>, BootstrapError> {
    let mut manifests = Vec::new();
    for root in search_paths {
        walk(root, &mut manifests)?;
    }
    Ok(manifests)
}

fn walk(dir: &Path, manifests: &mut Vec<PathBuf>) -> Result<(), BootstrapError> {
    let read_dir = fs::read_dir(dir).map_err(|source| BootstrapError::ConfigDiscovery {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| BootstrapError::ConfigDiscovery {
            path: dir.to_path_buf(),
            source,
        })?;
        entries.push(entry.path());
    }
    // Lexicographic order keeps discovery deterministic across platforms.
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, manifests)?;
        } else if path.file_name().is_some_and(|name| name == MODULE_MANIFEST_NAME) {
            manifests.push(path);
        }
    }
    Ok(())
}

/// Load every dynamically declared module into the catalogue.
///
/// For each discovered manifest in order, parse it, look up each identifier
/// in the constructor registry, and append the constructed module as
/// `Dynamic`. Any error leaves the bootstrap with no usable module set.
pub fn load_dynamic_modules(
    set: &mut ModuleSet,
    registry: &ModuleRegistry,
    search_paths: &[PathBuf],
) -> Result<(), BootstrapError> {
    for path in discover_manifests(search_paths)? {
        let raw = fs::read_to_string(&path).map_err(|source| BootstrapError::ConfigDiscovery {
            path: path.clone(),
            source,
        })?;
        let manifest: ModuleManifest =
            toml::from_str(&raw).map_err(|source| BootstrapError::ManifestParse {
                path: path.clone(),
                source,
            })?;

        for identifier in manifest.modules {
            let module =
                registry
                    .construct(&identifier)
                    .ok_or_else(|| BootstrapError::ModuleInstantiation {
                        identifier: identifier.clone(),
                        manifest: path.clone(),
                    })?;
            info!(module = %identifier, manifest = %path.display(), "loaded dynamic module");
            set.push_dynamic(identifier, module);
        }
    }
    Ok(())
}
