//! Polling producer: samples the scroll position on an interval.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::MissedTickBehavior;

use pioneer_core::{ActiveEvent, EventKind, Exporter};
use pioneer_session::NotebookSession;

use super::{Producer, Subscription, event_detail};
use crate::publisher::EventPublisher;

/// Default sampling interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Samples the session's scroll position on a timer and publishes when it
/// changes.
///
/// The interval comes from the active event's `params.interval` (in
/// milliseconds). The first sample only sets the baseline; an unscrolled
/// notebook produces no events.
#[derive(Debug, Clone, Copy)]
pub struct NotebookScrolledProducer;

impl NotebookScrolledProducer {
    fn interval(active: &ActiveEvent) -> Duration {
        let millis = active
            .params
            .as_ref()
            .and_then(|params| params.get("interval"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        Duration::from_millis(millis.max(1))
    }
}

impl Producer for NotebookScrolledProducer {
    fn kind(&self) -> EventKind {
        EventKind::NotebookScrolled
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
        let period = Self::interval(active);
        let mut closed = session.closed_signal();
        let weak = session.downgrade();

        let task_exporter = Arc::clone(&exporter);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_position: Option<f64> = None;

            loop {
                tokio::select! {
                    // Drop the non-Send watch::Ref inside the branch so the
                    // select future stays Send.
                    _ = async { let _ = closed.wait_for(|closed| *closed).await; } => break,
                    _ = ticker.tick() => {
                        let Some(session) = weak.upgrade() else { break };
                        let position = session.scroll_position().await;
                        match last_position {
                            Some(previous) if previous == position => {}
                            Some(_) => {
                                last_position = Some(position);
                                let detail = event_detail(kind, json!({ "position": position }));
                                if let Err(error) = publisher
                                    .publish_event(
                                        Some(&session),
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
                            None => last_position = Some(position),
                        }
                    }
                }
            }
        });

        Subscription::new(kind, &exporter, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_params() {
        let active = ActiveEvent {
            name: "notebook_scrolled".to_string(),
            params: Some(json!({"interval": 250})),
            log_whole_notebook: false,
        };
        assert_eq!(
            NotebookScrolledProducer::interval(&active),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_interval_default_and_floor() {
        let default = ActiveEvent::named("notebook_scrolled");
        assert_eq!(
            NotebookScrolledProducer::interval(&default),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );

        let zero = ActiveEvent {
            name: "notebook_scrolled".to_string(),
            params: Some(json!({"interval": 0})),
            log_whole_notebook: false,
        };
        // A zero interval would spin; clamp to 1ms.
        assert_eq!(
            NotebookScrolledProducer::interval(&zero),
            Duration::from_millis(1)
        );
    }
}
