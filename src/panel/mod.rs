//! Control plane ("panel") integration.
//!
//! # Data Flow
//! ```text
//! PanelClient::fetch
//!     → GET /api/v1/server/UniProxy/config
//!     → node.rs (decode JSON, boundary enums for ambiguous fields)
//!     → ETag compare: Unchanged short-circuit
//!     → node.rs (stamp identity, coerce intervals)
//!     → rules.rs (compile block routes into DestinationRule)
//!     → NodeInfo
//! ```
//!
//! # Design Decisions
//! - No retries here; the caller's schedule is the retry policy
//! - Rule compilation is all-or-nothing
//! - Routes are consumed during normalization and never stored

pub mod client;
pub mod error;
pub mod node;
pub mod rules;

pub use client::{FetchOutcome, PanelClient};
pub use error::{PanelError, PanelResult};
pub use node::{BaseConfig, NodeDescriptor, NodeIdentity, NodeInfo};
pub use rules::DestinationRule;
