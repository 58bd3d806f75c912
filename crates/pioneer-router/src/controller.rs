//! Per-session binding of producers to exporters.
//!
//! One controller exists per process. It consumes the session arrival
//! stream and drives each session through
//! opened → revealed → ready → bound; teardown back to closed is explicit,
//! dropping every subscription once the session's closed gate fires.

use std::sync::Arc;

use tokio::sync::mpsc;

use pioneer_core::{EventKind, Exporter};
use pioneer_session::NotebookSession;
use uuid::Uuid;

use crate::producers::{Subscription, producer_for};
use crate::publisher::EventPublisher;

/// Binds producers to every session that becomes ready.
///
/// The resolved exporter list and the publisher are read-only after startup
/// and shared across all bindings without synchronization.
#[derive(Clone)]
pub struct BindingController {
    exporters: Arc<Vec<Arc<Exporter>>>,
    publisher: Arc<EventPublisher>,
}

impl BindingController {
    /// Create a controller over an already-resolved exporter list.
    #[must_use]
    pub fn new(exporters: Vec<Exporter>, publisher: Arc<EventPublisher>) -> Self {
        Self {
            exporters: Arc::new(exporters.into_iter().map(Arc::new).collect()),
            publisher,
        }
    }

    /// Consume the session arrival stream, binding each session as it
    /// becomes ready.
    ///
    /// Bindings for distinct sessions are independent and run concurrently;
    /// within one session the reveal/ready waits sequence everything.
    /// Returns when the tracker side of the stream is dropped.
    pub async fn run(self, mut arrivals: mpsc::UnboundedReceiver<NotebookSession>) {
        while let Some(session) = arrivals.recv().await {
            let controller = self.clone();
            tokio::spawn(async move {
                let binding = controller.bind(&session).await;
                tracing::info!(
                    session_id = %session.session_id(),
                    listeners = binding.listener_count(),
                    "session bound"
                );
                session.closed().await;
                drop(binding);
                tracing::debug!(
                    session_id = %session.session_id(),
                    "session closed; listeners detached"
                );
            });
        }
        tracing::debug!("session arrival stream ended");
    }

    /// Bind one session: wait for reveal and readiness, then attach a
    /// listener for every (exporter, kind) pair in the exporter's effective
    /// subscription.
    ///
    /// Subscription names with no registry producer bind nothing, silently.
    /// Attachment order is exporter order, then registry order.
    pub async fn bind(&self, session: &NotebookSession) -> SessionBinding {
        session.revealed().await;
        session.ready().await;

        let mut subscriptions = Vec::new();
        for exporter in self.exporters.iter() {
            for kind in EventKind::ALL {
                let Some(active) = exporter.active_event(*kind) else {
                    continue;
                };
                let producer = producer_for(*kind);
                subscriptions.push(producer.listen(
                    session,
                    Arc::clone(&self.publisher),
                    Arc::clone(exporter),
                    active,
                ));
                tracing::debug!(
                    session_id = %session.session_id(),
                    kind = %kind,
                    exporter = %exporter.label(),
                    "listener attached"
                );
            }
        }

        SessionBinding {
            session_id: session.session_id(),
            subscriptions,
        }
    }
}

impl std::fmt::Debug for BindingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingController")
            .field("exporters", &self.exporters.len())
            .finish_non_exhaustive()
    }
}

/// Every listener attached to one session, torn down together.
#[derive(Debug)]
pub struct SessionBinding {
    session_id: Uuid,
    subscriptions: Vec<Subscription>,
}

impl SessionBinding {
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// (exporter label, kind) per attached listener, in attachment order.
    #[must_use]
    pub fn attachments(&self) -> Vec<(String, EventKind)> {
        self.subscriptions
            .iter()
            .map(|s| (s.exporter().to_string(), s.kind()))
            .collect()
    }

    /// Detach every listener now.
    pub fn dispose(self) {
        // Drop detaches each subscription.
    }
}
