//! Error taxonomy for the routing engine.
//!
//! Three failure classes, with deliberately different blast radii:
//!
//! - [`ConfigFetchError`] is fatal at startup; the engine never runs with a
//!   partial configuration.
//! - [`PublishError::InvalidSession`] is local to one publish call.
//! - [`PublishError::Transport`] is reported to the invoking producer, which
//!   logs and moves on: no retry, no backoff, at-most-once delivery per
//!   event. An unmatched event-kind name is not an error at all; it simply
//!   binds nothing.

use thiserror::Error;

/// Startup configuration or version fetch failed.
#[derive(Debug, Error)]
pub enum ConfigFetchError {
    /// The request never completed.
    #[error("collector request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("collector returned HTTP {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// The response body did not decode as configuration.
    #[error("invalid configuration payload: {0}")]
    Decode(#[source] serde_json::Error),
}

/// An export request failed or was rejected.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never completed (connection, timeout, ...).
    #[error("export request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("collector rejected export with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A single publish call failed.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The publisher was invoked without a live session, e.g. by a listener
    /// firing after its session was dropped.
    #[error("publisher invoked without a live notebook session")]
    InvalidSession,

    /// Delivery to the collector failed. The event is not retried.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
