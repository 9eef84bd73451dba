//! Panel and local configuration synchronization for proxy nodes.

pub mod config;
pub mod observability;
pub mod panel;
pub mod routing;
pub mod sync;

pub use config::{ConfigStore, ConfigTree, ConfigWatcher};
pub use panel::{FetchOutcome, NodeInfo, PanelClient};
