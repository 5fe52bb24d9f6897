use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::{AHashMap, AHashSet};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::{
    config::TrackerConfig,
    geomath::{distance_meters, GeoPoint},
    store::{NotificationEvent, Notifier, Store},
    tracking::{with_timeout, Assignment},
    Result,
};

/// What one distance observation did to a resident's alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Came inside the notify radius while armed: alert now.
    Entered,
    /// Left beyond the re-arm radius after being alerted.
    Rearmed,
    Unchanged,
}

/// Hysteresis memory for one route: which residents have already been alerted.
#[derive(Debug, Clone, Default)]
pub struct ProximityState {
    route_id: String,
    notified: AHashSet<String>,
}

impl ProximityState {
    pub fn new(route_id: impl Into<String>) -> Self {
        Self { route_id: route_id.into(), notified: AHashSet::new() }
    }

    #[inline] pub fn route_id(&self) -> &str { &self.route_id }

    #[inline] pub fn is_notified(&self, resident_id: &str) -> bool { self.notified.contains(resident_id) }

    #[inline] pub fn len(&self) -> usize { self.notified.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.notified.is_empty() }

    /// Forget every alert, re-arming all residents.
    #[inline] pub fn clear(&mut self) { self.notified.clear() }

    /// Record that `resident_id` is `distance_m` from the truck.
    ///
    /// Inside `notify_radius_m` an armed resident becomes notified; beyond
    /// `rearm_radius_m` a notified resident is re-armed. Anything in between
    /// keeps its current state, so a truck idling near the boundary cannot
    /// trigger repeated alerts.
    pub fn observe(&mut self, resident_id: &str, distance_m: f64, notify_radius_m: f64, rearm_radius_m: f64) -> Transition {
        if distance_m < notify_radius_m && !self.notified.contains(resident_id) {
            self.notified.insert(resident_id.to_string());
            Transition::Entered
        } else if distance_m > rearm_radius_m && self.notified.remove(resident_id) {
            Transition::Rearmed
        } else {
            Transition::Unchanged
        }
    }
}

/// Outcome of evaluating one truck position against a route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityReport {
    /// Residents with known coordinates that were measured.
    pub evaluated: usize,
    pub sent: Vec<NotificationEvent>,
    /// Alerts due for residents without a notification handle.
    pub skipped: usize,
    /// Alerts whose dispatch failed or timed out; they are not retried.
    pub failed: usize,
    pub rearmed: usize,
}

/// Turns truck positions into "truck nearby" alerts, one hysteresis state per route.
///
/// Each route's state sits behind its own async lock, so evaluations for one
/// route run one at a time while different routes never contend.
pub struct ProximityNotifier {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    config: TrackerConfig,
    routes: Mutex<AHashMap<String, Arc<AsyncMutex<ProximityState>>>>,
}

impl ProximityNotifier {
    /// Fails with `InvalidInput` if `config` has an inverted hysteresis band.
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, notifier, config, routes: Mutex::new(AHashMap::new()) })
    }

    #[inline] pub fn config(&self) -> &TrackerConfig { &self.config }

    fn routes(&self) -> MutexGuard<'_, AHashMap<String, Arc<AsyncMutex<ProximityState>>>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle to the state of `route_id`, created on first use.
    fn route_state(&self, route_id: &str) -> Arc<AsyncMutex<ProximityState>> {
        Arc::clone(self.routes().entry(route_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(ProximityState::new(route_id)))))
    }

    /// Evaluate a truck position for the assignment's route and dispatch alerts.
    ///
    /// Fails only if the resident list cannot be loaded. A failed dispatch is
    /// logged and counted and never stops the remaining residents from being
    /// evaluated.
    pub async fn evaluate(&self, assignment: &Assignment, driver: GeoPoint) -> Result<ProximityReport> {
        let route_id = assignment.route_id.as_str();
        let timeout = self.config.io_timeout();

        let state = self.route_state(route_id);
        let mut state = state.lock().await;

        let residents = with_timeout("load residents", timeout, self.store.residents_for_route(route_id)).await?;

        let mut report = ProximityReport::default();
        for resident in &residents {
            let Some(home) = resident.coords else { continue };
            report.evaluated += 1;

            let distance = distance_meters(&driver, &home);
            match state.observe(&resident.id, distance, self.config.notify_radius_m, self.config.rearm_radius_m) {
                Transition::Entered => {
                    let Some(handle) = resident.notify_handle.as_deref() else {
                        debug!(route_id, resident_id = %resident.id, "resident in range has no notification handle");
                        report.skipped += 1;
                        continue;
                    };

                    let event = NotificationEvent {
                        resident_id: resident.id.clone(),
                        route_id: route_id.to_string(),
                        driver_name: assignment.driver_name.clone(),
                        unit: assignment.unit.clone(),
                        distance_meters: distance.round() as u32,
                    };
                    match with_timeout("dispatch notification", timeout, self.notifier.send(handle, &event)).await {
                        Ok(()) => {
                            info!(route_id, resident_id = %resident.id, distance_m = event.distance_meters, "truck nearby alert sent");
                            report.sent.push(event);
                        }
                        Err(err) => {
                            warn!(route_id, resident_id = %resident.id, error = %err, "dropping truck nearby alert");
                            report.failed += 1;
                        }
                    }
                }
                Transition::Rearmed => {
                    debug!(route_id, resident_id = %resident.id, distance_m = distance, "resident re-armed");
                    report.rearmed += 1;
                }
                Transition::Unchanged => {}
            }
        }

        Ok(report)
    }

    /// Re-arm every resident of `route_id` and forget the route.
    ///
    /// The next evaluation of the route starts from fresh state.
    pub async fn reset(&self, route_id: &str) {
        let state = self.routes().remove(route_id);
        if let Some(state) = state {
            state.lock().await.clear();
            debug!(route_id, "proximity state cleared");
        }
    }

    /// Routes currently holding hysteresis state.
    #[inline] pub fn tracked_routes(&self) -> usize { self.routes().len() }

    /// Residents of `route_id` currently alerted, sorted.
    pub async fn notified_residents(&self, route_id: &str) -> Vec<String> {
        let state = self.routes().get(route_id).cloned();
        let Some(state) = state else { return Vec::new() };

        let mut ids: Vec<String> = state.lock().await.notified.iter().cloned().collect();
        ids.sort();
        ids
    }
}
