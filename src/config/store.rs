//! Live configuration tree and full-replace loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::hints::{self, DirectoryHints};
use crate::config::schema::ConfigTree;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The document could not be opened or read.
    #[error("open config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid configuration tree.
    #[error("decode config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document holds no content, e.g. mid-way through an in-place save.
    #[error("decode config {path}: empty document")]
    Empty { path: PathBuf },
}

/// Owner of the live configuration tree.
///
/// Readers take cheap snapshots with [`ConfigStore::current`]. Once a
/// [`ConfigWatcher`](crate::config::watcher::ConfigWatcher) is armed it is the
/// only caller of [`ConfigStore::load`]; anyone else must coordinate externally.
#[derive(Debug)]
pub struct ConfigStore {
    live: ArcSwap<ConfigTree>,
}

impl ConfigStore {
    /// Create a store holding the default tree.
    pub fn new() -> Self {
        Self {
            live: ArcSwap::from_pointee(ConfigTree::default()),
        }
    }

    /// Snapshot of the current tree.
    pub fn current(&self) -> Arc<ConfigTree> {
        self.live.load_full()
    }

    /// Load the document at `path` and replace the whole tree with it.
    ///
    /// Directory hints are published before the document is read. On error the
    /// previous tree stays live.
    pub fn load(&self, path: &Path) -> Result<Arc<ConfigTree>, ConfigLoadError> {
        hints::publish(DirectoryHints::for_config_file(path));

        let content = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if is_blank(&content) {
            return Err(ConfigLoadError::Empty {
                path: path.to_path_buf(),
            });
        }
        let tree: ConfigTree =
            serde_yaml::from_str(&content).map_err(|source| ConfigLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let tree = Arc::new(tree);
        self.live.store(Arc::clone(&tree));
        tracing::debug!(path = %path.display(), nodes = tree.nodes.len(), "Configuration loaded");
        Ok(tree)
    }
}

/// True when the document has nothing but whitespace and comments.
fn is_blank(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
