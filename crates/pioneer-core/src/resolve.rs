//! Exporter configuration resolution.
//!
//! Reconciles the globally active event list against per-exporter overrides
//! to produce each exporter's effective subscription. Runs once at startup;
//! the result is shared read-only across every session binding.

use crate::types::{ActiveEvent, Exporter};

/// Resolve each exporter's effective subscription list.
///
/// Two mutually exclusive branches:
///
/// - When `active_events` is non-empty, every exporter that declares no list
///   of its own inherits the global list; exporters with their own list are
///   left untouched (a narrower per-exporter subscription overrides the
///   default).
/// - When `active_events` is empty or absent, only exporters that declare a
///   non-empty list of their own survive. The rest would never receive an
///   event, so they are dropped rather than left silently idle.
///
/// Pure and infallible; preserves the input exporter order.
#[must_use]
pub fn resolve_exporters(
    active_events: Option<&[ActiveEvent]>,
    exporters: Vec<Exporter>,
) -> Vec<Exporter> {
    match active_events {
        Some(global) if !global.is_empty() => exporters
            .into_iter()
            .map(|mut exporter| {
                if exporter.active_events.is_none() {
                    exporter.active_events = Some(global.to_vec());
                }
                exporter
            })
            .collect(),
        _ => exporters
            .into_iter()
            .filter(|exporter| {
                exporter
                    .active_events
                    .as_ref()
                    .is_some_and(|events| !events.is_empty())
            })
            .collect(),
    }
}
