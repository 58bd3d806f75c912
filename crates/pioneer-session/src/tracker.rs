//! Session arrival notification stream.

use tokio::sync::mpsc;

use crate::document::NotebookDocument;
use crate::session::NotebookSession;

/// Announces newly opened notebook sessions to the binding controller.
///
/// One tracker exists per process. The host opens sessions through it; the
/// controller consumes the paired receiver and binds each arrival.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    arrivals: mpsc::UnboundedSender<NotebookSession>,
}

impl SessionTracker {
    /// Create a tracker and the arrival stream it feeds.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotebookSession>) {
        let (arrivals, receiver) = mpsc::unbounded_channel();
        (Self { arrivals }, receiver)
    }

    /// Open a session and announce it.
    ///
    /// If the controller has gone away the session still opens; the host
    /// keeps working, just uninstrumented.
    pub fn open(&self, path: impl Into<String>, document: NotebookDocument) -> NotebookSession {
        let session = NotebookSession::new(path, document);
        tracing::info!(
            session_id = %session.session_id(),
            path = %session.path(),
            "notebook session opened"
        );
        if self.arrivals.send(session.clone()).is_err() {
            tracing::warn!(
                session_id = %session.session_id(),
                "no binding controller listening; session will not be instrumented"
            );
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_announces_session() {
        let (tracker, mut arrivals) = SessionTracker::channel();
        let session = tracker.open("a.ipynb", NotebookDocument::default());

        let arrived = arrivals.recv().await.unwrap();
        assert_eq!(arrived.session_id(), session.session_id());
        assert_eq!(arrived.path(), "a.ipynb");
    }

    #[tokio::test]
    async fn test_open_without_controller_still_returns_session() {
        let (tracker, arrivals) = SessionTracker::channel();
        drop(arrivals);

        let session = tracker.open("b.ipynb", NotebookDocument::default());
        assert_eq!(session.path(), "b.ipynb");
    }

    #[tokio::test]
    async fn test_arrival_order() {
        let (tracker, mut arrivals) = SessionTracker::channel();
        tracker.open("1.ipynb", NotebookDocument::default());
        tracker.open("2.ipynb", NotebookDocument::default());

        assert_eq!(arrivals.recv().await.unwrap().path(), "1.ipynb");
        assert_eq!(arrivals.recv().await.unwrap().path(), "2.ipynb");
    }
}
