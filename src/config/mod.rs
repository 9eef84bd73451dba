//! Local configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML)
//!     → hints.rs (publish asset/config directories)
//!     → store.rs (parse & deserialize, full replace)
//!     → ConfigTree (immutable snapshot)
//!     → shared via Arc to all subsystems
//!
//! On write event in the config directory:
//!     watcher.rs detects change
//!     → store.rs loads new tree
//!     → atomic swap of Arc<ConfigTree>
//!     → reload callback notifies subsystems
//! ```
//!
//! # Design Decisions
//! - Reloads replace the whole tree; absent fields revert to defaults
//! - A failed reload keeps the previous tree authoritative
//! - Watch subsystem errors terminate the process unless configured otherwise

pub mod hints;
pub mod schema;
pub mod store;
pub mod watcher;

pub use schema::{ConfigTree, ConnectionConfig, LogConfig, NodeConfig};
pub use store::{ConfigLoadError, ConfigStore};
pub use watcher::{ConfigWatcher, WatchError, WatchErrorPolicy};
