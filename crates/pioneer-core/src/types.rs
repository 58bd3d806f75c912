//! Configuration and wire types for the instrumentation engine.
//!
//! The wire shapes use camelCase field names (`activeEvents`, `eventDetail`,
//! `sessionID`, ...) to stay compatible with the collector protocol. All
//! configuration types are read-only after startup resolution and are shared
//! across every session binding for the process lifetime.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Event Kinds
// ============================================================================

/// A category of observable notebook activity.
///
/// The set of kinds is fixed per build: configuration refers to kinds by
/// their wire name (e.g. `"cell_executed"`), and names that match no variant
/// simply never bind a listener. `ALL` lists the variants in registry order,
/// which is also the binding order within one exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CellExecuted,
    CellEdited,
    CellAdded,
    CellRemoved,
    ActiveCellChanged,
    NotebookOpened,
    NotebookSaved,
    NotebookScrolled,
    NotebookVisible,
    NotebookHidden,
    ClipboardCopy,
    ClipboardCut,
    ClipboardPaste,
}

impl EventKind {
    /// Every kind, in registry order.
    pub const ALL: &'static [EventKind] = &[
        EventKind::CellExecuted,
        EventKind::CellEdited,
        EventKind::CellAdded,
        EventKind::CellRemoved,
        EventKind::ActiveCellChanged,
        EventKind::NotebookOpened,
        EventKind::NotebookSaved,
        EventKind::NotebookScrolled,
        EventKind::NotebookVisible,
        EventKind::NotebookHidden,
        EventKind::ClipboardCopy,
        EventKind::ClipboardCut,
        EventKind::ClipboardPaste,
    ];

    /// The wire name used in configuration and event details.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CellExecuted => "cell_executed",
            Self::CellEdited => "cell_edited",
            Self::CellAdded => "cell_added",
            Self::CellRemoved => "cell_removed",
            Self::ActiveCellChanged => "active_cell_changed",
            Self::NotebookOpened => "notebook_opened",
            Self::NotebookSaved => "notebook_saved",
            Self::NotebookScrolled => "notebook_scrolled",
            Self::NotebookVisible => "notebook_visible",
            Self::NotebookHidden => "notebook_hidden",
            Self::ClipboardCopy => "clipboard_copy",
            Self::ClipboardCut => "clipboard_cut",
            Self::ClipboardPaste => "clipboard_paste",
        }
    }

    /// Look up a kind by its wire name.
    ///
    /// Returns `None` for names with no matching variant. An unmatched name
    /// in an exporter's subscription is not an error; it binds nothing.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// A declared interest in one event kind, with optional parameters.
///
/// `params` carries per-kind tuning (e.g. a polling interval for
/// `notebook_scrolled`); `log_whole_notebook` requests a full document
/// snapshot in every envelope produced for this kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEvent {
    /// Wire name of the event kind this entry subscribes to.
    pub name: String,
    /// Optional per-kind parameters, interpreted by the matching producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Include a full document snapshot in envelopes for this kind.
    #[serde(default)]
    pub log_whole_notebook: bool,
}

impl ActiveEvent {
    /// Declare an interest in `name` with no parameters.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
            log_whole_notebook: false,
        }
    }
}

/// One configured delivery target for exported events.
///
/// Created from configuration at startup, never mutated after resolution,
/// and shared read-only across all session bindings. The `kind` descriptor
/// and `args` are opaque to this engine; the collector interprets them to
/// pick a storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exporter {
    /// Transport/backend descriptor (e.g. `"console_exporter"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional operator-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Opaque backend arguments, forwarded verbatim to the collector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    /// This exporter's subscription list. Absence means "inherit the global
    /// list" during resolution; see [`crate::resolve_exporters`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_events: Option<Vec<ActiveEvent>>,
}

impl Exporter {
    /// Identifier used in logs: the operator id when present, else the
    /// backend descriptor.
    #[must_use]
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.kind)
    }

    /// The subscription entry for `kind`, if this exporter declares one.
    #[must_use]
    pub fn active_event(&self, kind: EventKind) -> Option<&ActiveEvent> {
        self.active_events
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|e| e.name == kind.as_str())
    }
}

/// Collector-provided configuration, fetched once at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Globally active event kinds, inherited by exporters that declare none.
    #[serde(default)]
    pub active_events: Option<Vec<ActiveEvent>>,
    /// Declared delivery targets.
    #[serde(default)]
    pub exporters: Vec<Exporter>,
}

// ============================================================================
// Event Envelope
// ============================================================================

/// Identity and (optionally) content of the notebook an event came from.
///
/// Derived fresh from the live session on every publish; never persisted by
/// this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookState {
    /// Kernel session identifier, if the session exposes one.
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    /// Path of the notebook document.
    #[serde(rename = "notebookPath")]
    pub notebook_path: String,
    /// Full document snapshot, present only when the active event requested
    /// whole-notebook logging.
    #[serde(rename = "notebookContent")]
    pub notebook_content: Option<Value>,
}

/// The canonical payload handed to the collector, one per observed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Producer-supplied event details, passed through verbatim.
    pub event_detail: Value,
    /// Originating notebook identity and optional content.
    pub notebook_state: NotebookState,
    /// The delivery target this envelope is addressed to.
    pub exporter: Exporter,
}

// ============================================================================
// Tests
// ============================================================================
