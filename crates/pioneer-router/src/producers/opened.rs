//! One-shot producer: reports the notebook-opened event at bind time.

use std::sync::Arc;

use serde_json::json;

use pioneer_core::{ActiveEvent, EventKind, Exporter};
use pioneer_session::NotebookSession;

use super::{Producer, Subscription, event_detail};
use crate::publisher::EventPublisher;

/// Publishes a single `notebook_opened` event when the binding is attached.
///
/// Binding happens once the session is revealed and ready, so "opened" here
/// means "opened and instrumented".
#[derive(Debug, Clone, Copy)]
pub struct NotebookOpenedProducer;

impl Producer for NotebookOpenedProducer {
    fn kind(&self) -> EventKind {
        EventKind::NotebookOpened
    }

    fn listen(
        &self,
        session: &NotebookSession,
        publisher: Arc<EventPublisher>,
        exporter: Arc<Exporter>,
        active: &ActiveEvent,
    ) -> Subscription {
        let kind = self.kind();
        let log_whole_notebook = active.log_whole_notebook;
        let weak = session.downgrade();
        let path = session.path().to_string();

        let task_exporter = Arc::clone(&exporter);
        let handle = tokio::spawn(async move {
            let detail = event_detail(kind, json!({ "path": path }));
            let session = weak.upgrade();
            if let Err(error) = publisher
                .publish_event(session.as_ref(), detail, log_whole_notebook, &task_exporter)
                .await
            {
                tracing::warn!(
                    kind = %kind,
                    exporter = %task_exporter.label(),
                    %error,
                    "event publish failed"
                );
            }
        });

        Subscription::new(kind, &exporter, handle)
    }
}
