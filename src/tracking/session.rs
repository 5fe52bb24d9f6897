use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{
    config::TrackerConfig,
    geomath::GeoPoint,
    store::Store,
    tracking::{with_timeout, PositionSample, PositionSource, ProximityNotifier, Subscription},
    Error, Result,
};

/// Lifecycle of a tracking session.
///
/// `Idle -> Active <-> Paused -> Stopped`; a stopped session may be started again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Active,
    Paused,
    Stopped,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        })
    }
}

/// Who is driving which route in which truck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub driver_id: String,
    pub driver_name: String,
    pub route_id: String,
    pub unit: String,
}

impl Assignment {
    pub fn new(
        driver_id: impl Into<String>,
        driver_name: impl Into<String>,
        route_id: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self { driver_id: driver_id.into(), driver_name: driver_name.into(), route_id: route_id.into(), unit: unit.into() }
    }
}

/// Observable state of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub assignment: Option<Assignment>,
    pub last_position: Option<GeoPoint>,
    pub last_speed_kmh: f64,
    pub last_heading_deg: f64,
    /// Samples fully handled while active (persisted and evaluated).
    pub accepted: u64,
    /// Samples dropped because the session was not active.
    pub discarded: u64,
}

#[inline]
fn lock(state: &Mutex<SessionSnapshot>) -> MutexGuard<'_, SessionSnapshot> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One driver's live tracking: owns the position subscription and pushes
/// every accepted sample to the store and the proximity notifier.
///
/// Samples are handled one at a time in arrival order on a dedicated task,
/// so a slow store or notifier only ever delays this driver.
pub struct TrackingSession {
    source: Arc<dyn PositionSource>,
    store: Arc<dyn Store>,
    proximity: Arc<ProximityNotifier>,
    state: Arc<Mutex<SessionSnapshot>>,
    pump: Option<JoinHandle<()>>,
}

impl TrackingSession {
    /// Create an idle session. Cadence and timeouts come from the notifier's config.
    pub fn new(source: Arc<dyn PositionSource>, store: Arc<dyn Store>, proximity: Arc<ProximityNotifier>) -> Self {
        Self { source, store, proximity, state: Arc::default(), pump: None }
    }

    #[inline] pub fn status(&self) -> SessionStatus { lock(&self.state).status }

    /// True only while samples are being accepted (not while paused).
    #[inline] pub fn is_active(&self) -> bool { self.status() == SessionStatus::Active }

    #[inline] pub fn snapshot(&self) -> SessionSnapshot { lock(&self.state).clone() }

    #[inline] fn config(&self) -> &TrackerConfig { self.proximity.config() }

    /// Begin tracking `assignment`. Allowed from `Idle` or `Stopped`.
    ///
    /// Starting an already active or paused session is rejected with
    /// `InvalidStateTransition`. If the source refuses location permission the
    /// error is returned and the session stays where it was.
    pub async fn start(&mut self, assignment: Assignment) -> Result<()> {
        let from = self.status();
        if !matches!(from, SessionStatus::Idle | SessionStatus::Stopped) {
            return Err(Error::InvalidStateTransition { from, action: "start" });
        }

        let subscription = self.source.subscribe(self.config().cadence).await
            .inspect_err(|err| warn!(driver_id = %assignment.driver_id, error = %err, "cannot start tracking"))?;

        // a finished stream from the previous run may have left its task behind
        if let Some(pump) = self.pump.take() { pump.abort() }

        *lock(&self.state) = SessionSnapshot {
            status: SessionStatus::Active,
            assignment: Some(assignment.clone()),
            ..SessionSnapshot::default()
        };

        let span = info_span!("tracking", driver_id = %assignment.driver_id, route_id = %assignment.route_id);
        info!(parent: &span, unit = %assignment.unit, "tracking started");

        let handler = SampleHandler {
            state: Arc::clone(&self.state),
            store: Arc::clone(&self.store),
            proximity: Arc::clone(&self.proximity),
            io_timeout: self.config().io_timeout(),
            assignment,
        };
        self.pump = Some(tokio::spawn(handler.run(subscription).instrument(span)));

        Ok(())
    }

    fn transition(&self, action: &'static str, from: SessionStatus, to: SessionStatus) -> Result<()> {
        let mut state = lock(&self.state);
        if state.status != from {
            return Err(Error::InvalidStateTransition { from: state.status, action });
        }
        state.status = to;
        debug!(driver_id = ?state.assignment.as_ref().map(|a| &a.driver_id), %from, %to, "session {action}");
        Ok(())
    }

    /// Stop accepting samples without dropping the subscription.
    pub fn pause(&self) -> Result<()> { self.transition("pause", SessionStatus::Active, SessionStatus::Paused) }

    pub fn resume(&self) -> Result<()> { self.transition("resume", SessionStatus::Paused, SessionStatus::Active) }

    /// Tear down the subscription and re-arm every resident on the route.
    ///
    /// In-flight store writes and dispatches are cancelled; alerts already
    /// sent stay sent. Stopping an idle or stopped session does nothing.
    pub async fn stop(&mut self) -> Result<()> {
        let assignment = {
            let mut state = lock(&self.state);
            if matches!(state.status, SessionStatus::Idle | SessionStatus::Stopped) { return Ok(()) }
            state.status = SessionStatus::Stopped;
            state.assignment.clone()
        };

        if let Some(pump) = self.pump.take() {
            pump.abort();
            // resolves once the task, and with it the subscription, is gone
            let _ = pump.await;
        }

        if let Some(assignment) = assignment {
            self.proximity.reset(&assignment.route_id).await;
            info!(driver_id = %assignment.driver_id, route_id = %assignment.route_id, "tracking stopped");
        }
        Ok(())
    }

    /// Wait for the position stream to end on its own.
    ///
    /// Only finite sources (e.g. a replay) end by themselves; the session
    /// keeps its status until [`stop`](Self::stop) is called.
    pub async fn drain(&mut self) {
        if let Some(pump) = self.pump.take() {
            let _ = pump.await;
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() { pump.abort() }
    }
}

/// The per-session task body: applies each sample's three effects in order.
struct SampleHandler {
    state: Arc<Mutex<SessionSnapshot>>,
    store: Arc<dyn Store>,
    proximity: Arc<ProximityNotifier>,
    io_timeout: Duration,
    assignment: Assignment,
}

impl SampleHandler {
    async fn run(self, mut subscription: Subscription) {
        while let Some(sample) = subscription.next().await {
            self.handle(sample).await;
        }
        debug!("position stream ended");
    }

    async fn handle(&self, sample: PositionSample) {
        {
            let mut state = lock(&self.state);
            if state.status != SessionStatus::Active {
                state.discarded += 1;
                return;
            }
            state.last_position = Some(sample.position);
            state.last_speed_kmh = sample.speed_kmh;
            state.last_heading_deg = sample.heading_deg;
        }

        let driver_id = self.assignment.driver_id.as_str();
        if let Err(err) = with_timeout("persist position", self.io_timeout, self.store.persist_position(driver_id, &sample)).await {
            warn!(error = %err, "position snapshot not stored");
        }

        match self.proximity.evaluate(&self.assignment, sample.position).await {
            Ok(report) if !report.sent.is_empty() || report.failed > 0 => {
                debug!(sent = report.sent.len(), failed = report.failed, "proximity evaluated");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "proximity check skipped"),
        }

        lock(&self.state).accepted += 1;
    }
}
