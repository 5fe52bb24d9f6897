mod proximity;
mod sample;
mod session;
mod source;

use std::{future::Future, time::Duration};

use crate::{Error, Result};

pub use proximity::{ProximityNotifier, ProximityReport, ProximityState, Transition};
pub use sample::PositionSample;
pub use session::{Assignment, SessionSnapshot, SessionStatus, TrackingSession};
pub use source::{CadenceFilter, ChannelSource, PositionSource, ReplaySource, Subscription};

/// Bound an external call by `after`, turning expiry into a recoverable `Timeout`.
pub(crate) async fn with_timeout<T>(
    operation: &'static str,
    after: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(after, call).await
        .unwrap_or_else(|_elapsed| Err(Error::Timeout { operation, after }))
}
