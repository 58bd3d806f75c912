//! Event production and routing engine for the Pioneer instrumentation
//! workspace.
//!
//! This crate wires configuration to live listeners:
//!
//! - [`transport`]: the collector protocol client (config fetch at startup,
//!   one export POST per event) behind the [`ExportTransport`] seam
//! - [`publisher`]: the single choke point every produced event passes
//!   through; builds the envelope and hands it to the transport
//! - [`producers`]: the static registry of event-kind producers and the
//!   listening mechanisms they use (signal, one-shot, polling)
//! - [`controller`]: per-session binding, driving
//!   opened → revealed → ready → bound → closed
//!
//! # Usage
//!
//! ```rust,ignore
//! use pioneer_core::resolve_exporters;
//! use pioneer_router::{BindingController, EventPublisher, HttpTransport};
//! use pioneer_session::SessionTracker;
//! use std::sync::Arc;
//!
//! let transport = Arc::new(HttpTransport::new("http://localhost:8890"));
//! let config = transport.fetch_config().await?;
//! let exporters = resolve_exporters(config.active_events.as_deref(), config.exporters);
//!
//! let publisher = Arc::new(EventPublisher::new(transport));
//! let (tracker, arrivals) = SessionTracker::channel();
//! tokio::spawn(BindingController::new(exporters, publisher).run(arrivals));
//! ```

pub mod controller;
pub mod error;
pub mod producers;
pub mod publisher;
pub mod transport;

// Re-exports for convenience
pub use controller::{BindingController, SessionBinding};
pub use error::{ConfigFetchError, PublishError, TransportError};
pub use producers::{Producer, Subscription, producer_for};
pub use publisher::EventPublisher;
pub use transport::{ExportAck, ExportTransport, HttpTransport};

// Re-export dependent crates
pub use pioneer_core;
pub use pioneer_session;
