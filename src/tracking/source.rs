use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;

use crate::{
    config::Cadence,
    geomath::{distance_meters, GeoPoint},
    tracking::PositionSample,
    Error, Result,
};

const CHANNEL_CAPACITY: usize = 64;

#[inline]
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

/// A platform location feed.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Open an ordered feed of samples honouring `cadence`.
    ///
    /// Fails with `PermissionDenied` when the platform refuses location access.
    async fn subscribe(&self, cadence: Cadence) -> Result<Subscription>;
}

/// A live, ordered, non-restartable feed of samples.
///
/// Dropping or cancelling it unsubscribes from the underlying source.
pub struct Subscription {
    samples: mpsc::Receiver<PositionSample>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a receiver, running `on_cancel` once when the subscription goes away.
    pub fn new(samples: mpsc::Receiver<PositionSample>, on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { samples, on_cancel: Some(Box::new(on_cancel)) }
    }

    /// Next sample, or `None` once the source has finished.
    pub async fn next(&mut self) -> Option<PositionSample> { self.samples.recv().await }

    /// Unsubscribe now; the teardown itself runs in `Drop`.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.samples.close();
        if let Some(on_cancel) = self.on_cancel.take() { on_cancel() }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("cancelled", &self.on_cancel.is_none()).finish()
    }
}

/// Thins a raw feed down to a two-trigger cadence: a sample passes when the
/// interval has elapsed or the minimum distance has been covered since the
/// last sample that passed, whichever happens first.
#[derive(Debug, Clone)]
pub struct CadenceFilter {
    interval: TimeDelta,
    min_distance_m: f64,
    last: Option<(GeoPoint, DateTime<Utc>)>,
}

impl CadenceFilter {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            interval: i64::try_from(cadence.interval_secs).ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or(TimeDelta::MAX),
            min_distance_m: cadence.min_distance_m,
            last: None,
        }
    }

    /// Decide whether `sample` is emitted. The first sample always is.
    pub fn admit(&mut self, sample: &PositionSample) -> bool {
        let admit = match self.last {
            None => true,
            Some((position, at)) => {
                sample.timestamp.signed_duration_since(at) >= self.interval
                    || distance_meters(&position, &sample.position) >= self.min_distance_m
            }
        };
        if admit { self.last = Some((sample.position, sample.timestamp)) }
        admit
    }
}

struct Feed {
    generation: u64,
    tx: mpsc::Sender<PositionSample>,
    filter: CadenceFilter,
}

#[derive(Default)]
struct ChannelInner {
    denied: AtomicBool,
    generation: AtomicU64,
    feed: Mutex<Option<Feed>>,
}

/// A source fed by hand: every pushed sample goes through the cadence filter
/// of the current subscription. Used by tests and embedding hosts that
/// receive fixes from elsewhere.
#[derive(Clone, Default)]
pub struct ChannelSource {
    inner: Arc<ChannelInner>,
}

impl ChannelSource {
    pub fn new() -> Self { Self::default() }

    /// Grant or revoke location permission for future subscriptions.
    pub fn set_authorized(&self, authorized: bool) { self.inner.denied.store(!authorized, Ordering::SeqCst) }

    pub fn is_subscribed(&self) -> bool { lock(&self.inner.feed).is_some() }

    /// Offer a raw sample. Returns true if it was delivered to a subscriber.
    pub async fn push(&self, sample: PositionSample) -> bool {
        let tx = {
            let mut feed = lock(&self.inner.feed);
            let Some(feed) = feed.as_mut() else { return false };
            if !feed.filter.admit(&sample) { return false }
            feed.tx.clone()
        };
        tx.send(sample).await.is_ok()
    }

    /// End the current subscription's stream.
    pub fn close(&self) { lock(&self.inner.feed).take(); }
}

impl fmt::Debug for ChannelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSource").field("subscribed", &self.is_subscribed()).finish()
    }
}

#[async_trait]
impl PositionSource for ChannelSource {
    async fn subscribe(&self, cadence: Cadence) -> Result<Subscription> {
        if self.inner.denied.load(Ordering::SeqCst) { return Err(Error::PermissionDenied) }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.inner.feed) = Some(Feed { generation, tx, filter: CadenceFilter::new(cadence) });

        // only tear down our own feed, not one opened by a later subscribe
        let inner = Arc::clone(&self.inner);
        Ok(Subscription::new(rx, move || {
            let mut feed = lock(&inner.feed);
            if feed.as_ref().is_some_and(|f| f.generation == generation) { feed.take(); }
        }))
    }
}

/// Replays a recorded track through the cadence filter, optionally paced in real time.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    samples: Vec<PositionSample>,
    pace: Option<Duration>,
}

impl ReplaySource {
    pub fn new(samples: Vec<PositionSample>) -> Self { Self { samples, pace: None } }

    /// Wait `pace` between emitted samples.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }
}

#[async_trait]
impl PositionSource for ReplaySource {
    async fn subscribe(&self, cadence: Cadence) -> Result<Subscription> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let samples = self.samples.clone();
        let pace = self.pace;

        let task = tokio::spawn(async move {
            let mut filter = CadenceFilter::new(cadence);
            for sample in samples.into_iter().filter(|s| filter.admit(s)) {
                if tx.send(sample).await.is_err() { break }
                if let Some(pace) = pace { tokio::time::sleep(pace).await }
            }
        });

        Ok(Subscription::new(rx, move || task.abort()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(lat: f64, secs: i64) -> PositionSample {
        let at = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        PositionSample::new(GeoPoint::new(lat, -99.0).unwrap(), 20.0, 90.0, at)
    }

    // ~1.1 m of latitude
    const STEP: f64 = 0.00001;

    #[test]
    fn cadence_admits_on_time_or_distance() {
        let mut filter = CadenceFilter::new(Cadence::default());
        assert!(filter.admit(&sample(19.0, 0)));
        assert!(!filter.admit(&sample(19.0 + STEP, 10)));       // 1 m, 10 s
        assert!(filter.admit(&sample(19.0 + STEP, 30)));        // interval elapsed
        assert!(!filter.admit(&sample(19.0 + 5.0 * STEP, 31))); // ~4.4 m since last pass
        assert!(filter.admit(&sample(19.0 + 20.0 * STEP, 32))); // ~21 m moved
    }

    #[tokio::test]
    async fn channel_source_permission_and_close() {
        let source = ChannelSource::new();
        source.set_authorized(false);
        assert_eq!(source.subscribe(Cadence::default()).await.unwrap_err(), Error::PermissionDenied);
        assert!(!source.push(sample(19.0, 0)).await);

        source.set_authorized(true);
        let mut sub = source.subscribe(Cadence::default()).await.unwrap();
        assert!(source.push(sample(19.0, 0)).await);
        assert!(!source.push(sample(19.0, 1)).await); // filtered by cadence
        source.close();
        assert_eq!(sub.next().await.map(|s| s.timestamp), Some(sample(19.0, 0).timestamp));
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn cancel_unsubscribes() {
        let source = ChannelSource::new();
        let sub = source.subscribe(Cadence::default()).await.unwrap();
        assert!(source.is_subscribed());
        sub.cancel();
        assert!(!source.is_subscribed());
        assert!(!source.push(sample(19.0, 0)).await);
    }

    #[tokio::test]
    async fn stale_cancel_keeps_newer_feed() {
        let source = ChannelSource::new();
        let first = source.subscribe(Cadence::default()).await.unwrap();
        let _second = source.subscribe(Cadence::default()).await.unwrap();
        first.cancel();
        assert!(source.is_subscribed());
    }

    #[tokio::test]
    async fn replay_applies_cadence_in_order() {
        let track = vec![sample(19.0, 0), sample(19.0, 5), sample(19.001, 6), sample(19.001, 40)];
        let mut sub = ReplaySource::new(track).subscribe(Cadence::default()).await.unwrap();

        let mut seen = Vec::new();
        while let Some(s) = sub.next().await { seen.push(s.timestamp.timestamp() - 1_700_000_000) }
        assert_eq!(seen, [0, 6, 40]);
    }
}
