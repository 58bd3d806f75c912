//! In-memory notebook document with nbformat-shaped snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Kind of a notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

impl CellType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Raw => "raw",
        }
    }
}

/// One notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Stable cell identifier, as carried in nbformat >= 4.5 documents.
    pub id: String,
    pub cell_type: CellType,
    pub source: String,
}

impl Cell {
    pub fn code(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cell_type: CellType::Code,
            source: source.into(),
        }
    }

    pub fn markdown(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cell_type: CellType::Markdown,
            source: source.into(),
        }
    }
}

/// The live content of one notebook.
///
/// Only what whole-notebook logging needs: an ordered cell list that can be
/// serialized into an nbformat-shaped snapshot. Outputs, attachments, and
/// display metadata are the host's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookDocument {
    pub cells: Vec<Cell>,
}

impl NotebookDocument {
    #[must_use]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Replace the source of the cell at `index`. Out-of-range indices are
    /// ignored; the host may race an edit against a removal.
    pub fn set_cell_source(&mut self, index: usize, source: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.source = source.into();
        }
    }

    pub fn insert_cell(&mut self, index: usize, cell: Cell) {
        let index = index.min(self.cells.len());
        self.cells.insert(index, cell);
    }

    pub fn remove_cell(&mut self, index: usize) -> Option<Cell> {
        if index < self.cells.len() {
            Some(self.cells.remove(index))
        } else {
            None
        }
    }

    /// Full serialization of the document, nbformat-shaped.
    ///
    /// This is the expensive path taken only when an active event requests
    /// whole-notebook logging.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let cells: Vec<Value> = self
            .cells
            .iter()
            .map(|cell| {
                json!({
                    "id": cell.id,
                    "cell_type": cell.cell_type.as_str(),
                    "metadata": {},
                    "source": cell.source,
                })
            })
            .collect();

        json!({
            "cells": cells,
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5,
        })
    }
}
