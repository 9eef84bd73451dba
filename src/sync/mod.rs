//! Periodic node synchronization.
//!
//! # Data Flow
//! ```text
//! tokio interval tick
//!     → PanelClient::fetch
//!     → Changed: publish Arc<NodeInfo>, adopt pull_interval
//!     → Unchanged / error: keep the published NodeInfo
//! ```
//!
//! # Design Decisions
//! - One task per node; each task owns its client, so fetches never overlap
//! - Errors are logged and retried on the next tick

pub mod node;

pub use node::{NodeInfoReceiver, NodeSync, DEFAULT_PULL_INTERVAL, MAX_PULL_INTERVAL};
