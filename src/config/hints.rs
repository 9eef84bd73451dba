//! Directory hints for components that resolve relative paths.
//!
//! The proxy engine looks up geo assets and satellite files relative to the
//! configuration directory. The hints are published process-wide in a
//! lock-free slot. The environment variables the engine reads are written only
//! when the directories change, which for a fixed config path means once, on
//! the initial load, before any other thread reads the environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Environment variable naming the asset directory.
pub const ASSET_LOCATION_ENV: &str = "XRAY_LOCATION_ASSET";

/// Environment variable naming the configuration directory.
pub const CONFIG_LOCATION_ENV: &str = "XRAY_LOCATION_CONFIG";

static HINTS: ArcSwapOption<DirectoryHints> = ArcSwapOption::const_empty();

/// Asset and base directories derived from the configuration file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryHints {
    pub asset_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl DirectoryHints {
    /// Derive both hints from the configuration file's containing directory.
    ///
    /// A bare file name resolves to the current directory (`.`).
    pub fn for_config_file(path: &Path) -> Self {
        let dir = config_dir(path);
        Self {
            asset_dir: dir.clone(),
            config_dir: dir,
        }
    }
}

/// Directory containing the configuration file. A bare file name resolves to `.`.
pub fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Publish hints for downstream consumers.
///
/// Returns true when the environment variables were (re)written.
pub fn publish(hints: DirectoryHints) -> bool {
    let unchanged = HINTS.load().as_deref() == Some(&hints);
    if !unchanged {
        std::env::set_var(ASSET_LOCATION_ENV, &hints.asset_dir);
        std::env::set_var(CONFIG_LOCATION_ENV, &hints.config_dir);
        tracing::debug!(
            asset_dir = %hints.asset_dir.display(),
            config_dir = %hints.config_dir.display(),
            "Directory hints exported"
        );
    }
    HINTS.store(Some(Arc::new(hints)));
    !unchanged
}

/// The most recently published hints, if any.
pub fn current() -> Option<Arc<DirectoryHints>> {
    HINTS.load_full()
}
