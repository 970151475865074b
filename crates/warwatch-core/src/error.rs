//! Error taxonomy for the monitoring core.
//!
//! Fatal configuration failures are not represented here — they belong to
//! the binary crate and abort before any cycle runs. Everything below is a
//! value returned upward to the orchestrator's per-war `try`/continue loop
//! (spec §7, §9).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("persistence: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: String, to: String },
}

/// Errors surfaced by an `UpstreamClient` implementation.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, 5xx-equivalent response, or rate limit — the
    /// client layer already retried with backoff (spec §7) before
    /// surfacing this.
    #[error("transient upstream failure: {0}")]
    Transient(String),

    /// The response could not be decoded into the expected shape.
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced by a `LedgerStore` implementation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("transient persistence failure: {0}")]
    Transient(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
