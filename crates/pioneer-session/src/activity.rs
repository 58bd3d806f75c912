//! Observable occurrences the host reports on a notebook session.

use pioneer_core::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position and identity of the cell an activity concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub index: usize,
    pub id: String,
}

impl CellRef {
    #[must_use]
    pub fn new(index: usize, id: impl Into<String>) -> Self {
        Self {
            index,
            id: id.into(),
        }
    }
}

/// One observed occurrence on a notebook session.
///
/// The host emits these through [`crate::NotebookSession::emit`]; signal
/// producers filter the broadcast by [`Activity::kind`] and forward matching
/// occurrences to the publisher. Kinds without a variant here
/// (`notebook_opened`, `notebook_scrolled`) are observed by other means: a
/// one-shot at bind time and a polling timer respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Activity {
    CellExecuted {
        cell: CellRef,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kernel_error: Option<String>,
    },
    CellEdited {
        cell: CellRef,
    },
    CellAdded {
        cell: CellRef,
    },
    CellRemoved {
        cell: CellRef,
    },
    ActiveCellChanged {
        cell: CellRef,
    },
    NotebookSaved,
    NotebookVisible,
    NotebookHidden,
    ClipboardCopy {
        cell: CellRef,
        selection: String,
    },
    ClipboardCut {
        cell: CellRef,
        selection: String,
    },
    ClipboardPaste {
        cell: CellRef,
        selection: String,
    },
}

impl Activity {
    /// The event kind this occurrence belongs to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::CellExecuted { .. } => EventKind::CellExecuted,
            Self::CellEdited { .. } => EventKind::CellEdited,
            Self::CellAdded { .. } => EventKind::CellAdded,
            Self::CellRemoved { .. } => EventKind::CellRemoved,
            Self::ActiveCellChanged { .. } => EventKind::ActiveCellChanged,
            Self::NotebookSaved => EventKind::NotebookSaved,
            Self::NotebookVisible => EventKind::NotebookVisible,
            Self::NotebookHidden => EventKind::NotebookHidden,
            Self::ClipboardCopy { .. } => EventKind::ClipboardCopy,
            Self::ClipboardCut { .. } => EventKind::ClipboardCut,
            Self::ClipboardPaste { .. } => EventKind::ClipboardPaste,
        }
    }

    /// Occurrence details as a JSON mapping, for the event envelope.
    #[must_use]
    pub fn info(&self) -> Value {
        // Serialization of this enum cannot fail: no maps with non-string
        // keys, no non-finite floats.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
