//! Core data model for the Pioneer instrumentation engine.
//!
//! This crate defines the configuration and wire types shared by the rest of
//! the workspace:
//!
//! - Active events: declared interest in one kind of notebook activity
//! - Exporters: configured delivery targets with per-target subscriptions
//! - Event envelopes: the canonical payload handed to a collector
//! - Configuration resolution: reconciling global active events against
//!   per-exporter overrides
//!
//! Everything here is pure data. Fetching configuration, observing sessions,
//! and delivering envelopes live in `pioneer-session` and `pioneer-router`.

pub mod resolve;
pub mod types;

// Re-exports for convenience
pub use resolve::resolve_exporters;
pub use types::{ActiveEvent, Config, EventEnvelope, EventKind, Exporter, NotebookState};
