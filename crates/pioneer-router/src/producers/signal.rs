//! Signal-driven producer: forwards broadcast activity of one kind.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use pioneer_core::{ActiveEvent, EventKind, Exporter};
use pioneer_session::NotebookSession;

use super::{Producer, Subscription, event_detail};
use crate::publisher::EventPublisher;

/// Subscribes to the session activity broadcast and publishes every
/// occurrence of its kind.
///
/// One instance is bound per (session, exporter) activation; the listener
/// holds only a weak session reference and stops when the session closes or
/// its handles are gone.
#[derive(Debug, Clone, Copy)]
pub struct SignalProducer {
    kind: EventKind,
}

impl SignalProducer {
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self { kind }
    }
}

impl Producer for SignalProducer {
    fn kind(&self) -> EventKind {
        self.kind
    }

    fn listen(
        &self,
        session: &NotebookSession,
        publisher: Arc<EventPublisher>,
        exporter: Arc<Exporter>,
        active: &ActiveEvent,
    ) -> Subscription {
        let kind = self.kind;
        let log_whole_notebook = active.log_whole_notebook;
        let mut activities = session.activities();
        let mut closed = session.closed_signal();
        let weak = session.downgrade();

        let task_exporter = Arc::clone(&exporter);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Errors here mean the session itself is gone.
                    // Drop the non-Send watch::Ref inside the branch so the
                    // select future stays Send.
                    _ = async { let _ = closed.wait_for(|closed| *closed).await; } => break,
                    received = activities.recv() => match received {
                        Ok(activity) if activity.kind() == kind => {
                            let detail = event_detail(kind, activity.info());
                            let session = weak.upgrade();
                            if let Err(error) = publisher
                                .publish_event(
                                    session.as_ref(),
                                    detail,
                                    log_whole_notebook,
                                    &task_exporter,
                                )
                                .await
                            {
                                tracing::warn!(
                                    kind = %kind,
                                    exporter = %task_exporter.label(),
                                    %error,
                                    "event publish failed"
                                );
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                kind = %kind,
                                missed,
                                "activity listener lagged; occurrences dropped"
                            );
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });

        Subscription::new(kind, &exporter, handle)
    }
}
