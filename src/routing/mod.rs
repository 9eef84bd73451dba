//! Routing helpers for downstream consumers.
//!
//! # Data Flow
//! ```text
//! Panel fetch (changed)
//!     → panel::rules (compile block routes)
//!     → RuleSet (ordered, immutable)
//!     → matcher.rs (evaluate destination against rules)
//!     → Return: matching route id or None
//! ```

pub mod matcher;

pub use matcher::RuleSet;
