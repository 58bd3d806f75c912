//! Replay scripts: a JSONL description of session activity.
//!
//! Each line is one step. Examples:
//!
//! ```text
//! {"step": "emit", "activity": {"event": "cell_executed", "cell": {"index": 0, "id": "c1"}, "success": true}}
//! {"step": "edit_cell", "index": 0, "source": "print(2)"}
//! {"step": "scroll", "position": 640.0}
//! {"step": "pause", "ms": 250}
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use pioneer_session::Activity;

/// One step of a replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Emit an activity on the session.
    Emit { activity: Activity },
    /// Update a cell's source (so whole-notebook snapshots change).
    EditCell { index: usize, source: String },
    /// Move the scroll position (observed by the polling producer).
    Scroll { position: f64 },
    /// Wait before the next step.
    Pause { ms: u64 },
}

/// Script loading failures.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("could not read script {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid step on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSONL script. Blank lines and `#` comment lines are skipped.
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let contents = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut steps = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(line).map_err(|source| ScriptError::Parse {
            line: index + 1,
            source,
        })?;
        steps.push(step);
    }
    Ok(steps)
}
