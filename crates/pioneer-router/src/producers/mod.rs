//! Producer registry: one listening unit per event kind.
//!
//! The registry is static; the set of producers is fixed per build and
//! dispatch is an exhaustive match on [`EventKind`]. Three listening
//! mechanisms cover the catalog:
//!
//! - [`SignalProducer`]: subscribes to the session activity broadcast and
//!   forwards occurrences of its kind (most kinds)
//! - [`NotebookOpenedProducer`]: a one-shot that fires at bind time
//! - [`NotebookScrolledProducer`]: a polling timer sampling the scroll
//!   position
//!
//! Every producer swallows its own failures: a publish error is logged and
//! the listener keeps running, so one faulty delivery never blocks other
//! producers or later events.

mod opened;
mod scroll;
mod signal;

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use pioneer_core::{ActiveEvent, EventKind, Exporter};
use pioneer_session::NotebookSession;

use crate::publisher::EventPublisher;

pub use opened::NotebookOpenedProducer;
pub use scroll::NotebookScrolledProducer;
pub use signal::SignalProducer;

/// A unit that observes one kind of notebook activity.
pub trait Producer: Send + Sync {
    /// The event kind this producer implements.
    fn kind(&self) -> EventKind;

    /// Attach one observation point to `session`, reporting occurrences to
    /// `publisher` addressed to `exporter`.
    ///
    /// `active` is the exporter's subscription entry for this kind; it
    /// carries per-kind parameters and the whole-notebook logging flag.
    /// The returned [`Subscription`] detaches the listener when dropped.
    fn listen(
        &self,
        session: &NotebookSession,
        publisher: Arc<EventPublisher>,
        exporter: Arc<Exporter>,
        active: &ActiveEvent,
    ) -> Subscription;
}

/// The producer for `kind`.
#[must_use]
pub fn producer_for(kind: EventKind) -> Box<dyn Producer> {
    match kind {
        EventKind::NotebookOpened => Box::new(NotebookOpenedProducer),
        EventKind::NotebookScrolled => Box::new(NotebookScrolledProducer),
        signal_kind => Box::new(SignalProducer::new(signal_kind)),
    }
}

/// Canonical event detail: name, occurrence time, producer-specific info.
pub(crate) fn event_detail(kind: EventKind, info: Value) -> Value {
    json!({
        "eventName": kind.as_str(),
        "eventTime": Utc::now().timestamp_millis(),
        "eventInfo": info,
    })
}

/// An attached listener, detached on drop.
///
/// Session closure also stops the listener on its own; the explicit disposer
/// exists so bindings can be torn down (and tested) deterministically.
#[derive(Debug)]
pub struct Subscription {
    kind: EventKind,
    exporter: String,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(kind: EventKind, exporter: &Exporter, handle: JoinHandle<()>) -> Self {
        Self {
            kind,
            exporter: exporter.label().to_string(),
            handle,
        }
    }

    /// The event kind this listener observes.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Label of the exporter this listener feeds.
    #[must_use]
    pub fn exporter(&self) -> &str {
        &self.exporter
    }

    /// Detach the listener now.
    pub fn dispose(self) {
        // Drop aborts the task.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
