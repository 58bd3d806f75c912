//! Live notebook session handles and lifecycle gates.
//!
//! A [`NotebookSession`] is a cheap cloneable handle over shared state. The
//! host application holds strong handles and drives the session: marking it
//! revealed and ready, emitting activity, updating the document, and finally
//! closing it. The routing engine's listeners hold a [`WeakSession`] only,
//! so listener lifetime is bounded by session lifetime and never the other
//! way around.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio::sync::{RwLock, broadcast, watch};
use uuid::Uuid;

use crate::activity::Activity;
use crate::document::NotebookDocument;

/// Capacity of the per-session activity broadcast channel.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 256;

struct SessionInner {
    id: Uuid,
    path: String,
    document: RwLock<NotebookDocument>,
    scroll: RwLock<f64>,
    activity_tx: broadcast::Sender<Activity>,
    revealed: watch::Sender<bool>,
    ready: watch::Sender<bool>,
    closed: watch::Sender<bool>,
}

/// Handle to one open notebook session.
#[derive(Clone)]
pub struct NotebookSession {
    inner: Arc<SessionInner>,
}

impl NotebookSession {
    /// Open a new session over `document` at `path`.
    ///
    /// Sessions are normally opened through a
    /// [`SessionTracker`](crate::SessionTracker) so the binding controller
    /// hears about them.
    #[must_use]
    pub fn new(path: impl Into<String>, document: NotebookDocument) -> Self {
        let (activity_tx, _) = broadcast::channel(DEFAULT_ACTIVITY_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                path: path.into(),
                document: RwLock::new(document),
                scroll: RwLock::new(0.0),
                activity_tx,
                revealed: watch::Sender::new(false),
                ready: watch::Sender::new(false),
                closed: watch::Sender::new(false),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Kernel session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.id
    }

    /// Path of the notebook document.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Full serialization of the current document.
    pub async fn snapshot(&self) -> Value {
        self.inner.document.read().await.snapshot()
    }

    /// Apply a mutation to the document under the write lock.
    pub async fn update_document<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut NotebookDocument) -> R,
    {
        let mut document = self.inner.document.write().await;
        f(&mut document)
    }

    /// Current vertical scroll position, as reported by the host.
    pub async fn scroll_position(&self) -> f64 {
        *self.inner.scroll.read().await
    }

    pub async fn set_scroll_position(&self, position: f64) {
        *self.inner.scroll.write().await = position;
    }

    // ------------------------------------------------------------------
    // Activity broadcast
    // ------------------------------------------------------------------

    /// Report an observed occurrence to every attached listener.
    ///
    /// Returns the number of listeners that received it. Emitting on a
    /// closed session delivers nothing.
    pub fn emit(&self, activity: Activity) -> usize {
        if self.is_closed() {
            tracing::trace!(
                session_id = %self.inner.id,
                kind = %activity.kind(),
                "activity on closed session dropped"
            );
            return 0;
        }
        match self.inner.activity_tx.send(activity) {
            Ok(count) => count,
            // No listeners attached; nothing to deliver.
            Err(_) => 0,
        }
    }

    /// Subscribe to this session's activity broadcast.
    #[must_use]
    pub fn activities(&self) -> broadcast::Receiver<Activity> {
        self.inner.activity_tx.subscribe()
    }

    /// Number of currently attached activity listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.activity_tx.receiver_count()
    }

    // ------------------------------------------------------------------
    // Lifecycle gates
    // ------------------------------------------------------------------

    /// Mark the panel's initial rendering as finished. Idempotent.
    pub fn mark_revealed(&self) {
        self.inner.revealed.send_replace(true);
    }

    /// Mark the kernel/session context as ready. Idempotent.
    pub fn mark_ready(&self) {
        self.inner.ready.send_replace(true);
    }

    /// Close the session. Attached listeners observe this and stop firing.
    pub fn close(&self) {
        tracing::debug!(session_id = %self.inner.id, path = %self.inner.path, "session closed");
        self.inner.closed.send_replace(true);
    }

    /// Wait until the panel's content has finished initial rendering.
    ///
    /// Unbounded by design: the host's own rendering guarantee bounds it.
    pub async fn revealed(&self) {
        Self::wait_for_gate(&self.inner.revealed).await;
    }

    /// Wait until the kernel/session context is ready.
    ///
    /// May never resolve if the kernel fails to start; the host's lifecycle
    /// owns any timeout policy.
    pub async fn ready(&self) {
        Self::wait_for_gate(&self.inner.ready).await;
    }

    /// Wait until the session is closed.
    pub async fn closed(&self) {
        Self::wait_for_gate(&self.inner.closed).await;
    }

    /// A watch on the closed gate, for listener select loops.
    #[must_use]
    pub fn closed_signal(&self) -> watch::Receiver<bool> {
        self.inner.closed.subscribe()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    async fn wait_for_gate(gate: &watch::Sender<bool>) {
        let mut receiver = gate.subscribe();
        // The sender lives in the same Arc we hold, so wait_for cannot
        // observe a dropped sender.
        let _ = receiver.wait_for(|open| *open).await;
    }

    /// Downgrade to a weak handle for attaching listeners.
    #[must_use]
    pub fn downgrade(&self) -> WeakSession {
        WeakSession {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl std::fmt::Debug for NotebookSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotebookSession")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Weak handle to a session, held by listeners.
///
/// Upgrading fails once every strong handle is gone, which surfaces as an
/// invalid-session publish instead of keeping a dead session alive.
#[derive(Debug, Clone)]
pub struct WeakSession {
    inner: Weak<SessionInner>,
}

impl WeakSession {
    #[must_use]
    pub fn upgrade(&self) -> Option<NotebookSession> {
        self.inner.upgrade().map(|inner| NotebookSession { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::CellRef;
    use crate::document::Cell;

    fn session() -> NotebookSession {
        NotebookSession::new(
            "demo.ipynb",
            NotebookDocument::new(vec![Cell::code("c1", "print(1)")]),
        )
    }

    #[tokio::test]
    async fn test_gates_resolve_after_mark() {
        let session = session();
        session.mark_revealed();
        session.mark_ready();

        // Marked before the wait: both resolve immediately.
        session.revealed().await;
        session.ready().await;
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn test_gate_wakes_pending_waiter() {
        let session = session();
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move {
                session.revealed().await;
            })
        };
        session.mark_revealed();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let session = session();
        let mut activities = session.activities();

        let delivered = session.emit(Activity::CellEdited {
            cell: CellRef::new(0, "c1"),
        });
        assert_eq!(delivered, 1);

        let activity = activities.recv().await.unwrap();
        assert_eq!(activity.kind(), pioneer_core::EventKind::CellEdited);
    }

    #[tokio::test]
    async fn test_emit_without_listeners() {
        let session = session();
        assert_eq!(session.emit(Activity::NotebookSaved), 0);
    }

    #[tokio::test]
    async fn test_emit_after_close_is_dropped() {
        let session = session();
        let mut activities = session.activities();
        session.close();

        assert_eq!(session.emit(Activity::NotebookSaved), 0);
        assert!(matches!(
            activities.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_weak_upgrade_fails_after_drop() {
        let session = session();
        let weak = session.downgrade();
        assert!(weak.upgrade().is_some());
        drop(session);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_document_update_and_snapshot() {
        let session = session();
        session
            .update_document(|document| document.set_cell_source(0, "print(2)"))
            .await;

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot["cells"][0]["source"], "print(2)");
    }
}
