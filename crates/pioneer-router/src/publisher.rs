//! The single choke point every produced event passes through.

use std::sync::Arc;

use serde_json::Value;

use pioneer_core::{EventEnvelope, Exporter, NotebookState};
use pioneer_session::NotebookSession;

use crate::error::PublishError;
use crate::transport::ExportTransport;

/// Builds an envelope per event and hands it to the transport.
///
/// One publisher exists per process and is shared by every listener. Each
/// publish is independent: no ordering guarantee across producers or
/// sessions, no batching, no retry.
pub struct EventPublisher {
    transport: Arc<dyn ExportTransport>,
}

impl EventPublisher {
    #[must_use]
    pub fn new(transport: Arc<dyn ExportTransport>) -> Self {
        Self { transport }
    }

    /// Publish one event to one exporter.
    ///
    /// `session` is `None` when a listener fired without a live session
    /// (e.g. after its session was dropped); that fails the call with
    /// [`PublishError::InvalidSession`] before any transport work.
    ///
    /// The notebook state is read live from the session. A full document
    /// snapshot is serialized only when `log_whole_notebook` is set; it is
    /// the expensive path and is taken only on request.
    ///
    /// Transport failure is reported to the caller and nowhere else; the
    /// invoking producer is responsible for logging it and carrying on.
    pub async fn publish_event(
        &self,
        session: Option<&NotebookSession>,
        event_detail: Value,
        log_whole_notebook: bool,
        exporter: &Exporter,
    ) -> Result<(), PublishError> {
        let Some(session) = session else {
            return Err(PublishError::InvalidSession);
        };

        let notebook_content = if log_whole_notebook {
            Some(session.snapshot().await)
        } else {
            None
        };

        let envelope = EventEnvelope {
            event_detail,
            notebook_state: NotebookState {
                session_id: Some(session.session_id().to_string()),
                notebook_path: session.path().to_string(),
                notebook_content,
            },
            exporter: exporter.clone(),
        };

        let ack = self.transport.export(&envelope).await?;
        tracing::debug!(
            session_id = %session.session_id(),
            exporter = %exporter.label(),
            response = %ack.body,
            "event exported"
        );
        Ok(())
    }
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher").finish_non_exhaustive()
    }
}
