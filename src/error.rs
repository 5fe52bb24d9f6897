use std::time::Duration;

use crate::tracking::SessionStatus;

/// Errors raised by the geometry, clustering and tracking layers.
///
/// Algorithmic code only ever returns `EmptyInput` or `InvalidInput`; the
/// transient variants (`StoreUnavailable`, `Dispatch`, `Timeout`) come from
/// the external store and notifier seams and are never fatal to a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("no points given")]
    EmptyInput,

    #[error("cannot {action} a session that is {from}")]
    InvalidStateTransition { from: SessionStatus, action: &'static str },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("notification dispatch failed: {0}")]
    Dispatch(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for failures of external I/O that a caller may simply retry later.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Dispatch(_) | Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
