//! Notebook session model for the Pioneer instrumentation engine.
//!
//! This crate is the host collaborator surface the routing engine consumes:
//!
//! - [`NotebookSession`]: a handle over one open notebook, with identity
//!   accessors, document snapshots, an activity broadcast, and the three
//!   lifecycle gates (revealed, ready, closed)
//! - [`Activity`]: the observable occurrences a host reports on a session
//! - [`SessionTracker`]: the "new session appeared" notification stream the
//!   binding controller subscribes to
//!
//! The host application owns sessions and drives them (emitting activity,
//! updating the document, marking lifecycle transitions); listeners attached
//! by the routing engine hold only weak references and stop on their own
//! once a session closes.

pub mod activity;
pub mod document;
pub mod session;
pub mod tracker;

// Re-exports for convenience
pub use activity::{Activity, CellRef};
pub use document::{Cell, CellType, NotebookDocument};
pub use session::{NotebookSession, WeakSession};
pub use tracker::SessionTracker;
