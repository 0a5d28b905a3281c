//! Error taxonomy shared across the workspace.
//!
//! Probe-level failures are deliberately *not* represented here: a probe that
//! times out or returns garbage resolves to "no device found" and never
//! surfaces as an error. Only conditions a caller can act on get a variant.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The requested address range failed validation before any probing.
    #[error("invalid address range: {0}")]
    InvalidRange(String),

    /// The given scan id does not exist in the registry.
    #[error("scan {0} not found")]
    ScanNotFound(Uuid),

    /// A downstream persistence call failed. Collected per item during an
    /// import, never fatal to the import loop.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The circuit breaker is open; the call was suppressed without I/O.
    #[error("circuit open, downstream call suppressed")]
    CircuitOpen,
}
