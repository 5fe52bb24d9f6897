use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::{
    address::Address,
    store::{NotificationEvent, Notifier, Resident, Store},
    tracking::PositionSample,
    Error, Result,
};

#[inline]
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

/// In-process document store holding raw JSON documents, coerced on every read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    residents: Mutex<AHashMap<String, Vec<Value>>>,
    addresses: Mutex<Vec<Value>>,
    positions: Mutex<Vec<(String, PositionSample)>>,
    unavailable: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Add a resident document to a route.
    pub fn add_resident(&self, route_id: &str, doc: Value) {
        lock(&self.residents).entry(route_id.to_string()).or_default().push(doc);
    }

    /// Replace every resident document of a route.
    pub fn set_residents(&self, route_id: &str, docs: Vec<Value>) {
        lock(&self.residents).insert(route_id.to_string(), docs);
    }

    pub fn add_address(&self, doc: Value) { lock(&self.addresses).push(doc) }

    /// Simulate an outage: every call fails with `StoreUnavailable` while false.
    pub fn set_available(&self, available: bool) { self.unavailable.store(!available, Ordering::SeqCst) }

    /// Delay every call by `latency`, to exercise caller timeouts.
    pub fn set_latency(&self, latency: Option<Duration>) { *lock(&self.latency) = latency }

    /// Positions persisted for `driver_id`, oldest first.
    pub fn positions(&self, driver_id: &str) -> Vec<PositionSample> {
        lock(&self.positions).iter()
            .filter(|(driver, _)| driver == driver_id)
            .map(|(_, sample)| sample.clone())
            .collect()
    }

    async fn enter(&self) -> Result<()> {
        let latency = *lock(&self.latency);
        if let Some(latency) = latency { tokio::time::sleep(latency).await }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("memory store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn residents_for_route(&self, route_id: &str) -> Result<Vec<Resident>> {
        self.enter().await?;

        let residents = lock(&self.residents);
        let docs = residents.get(route_id).map(Vec::as_slice).unwrap_or_default();
        Ok(docs.iter()
            .filter_map(|doc| {
                let resident = Resident::from_document(doc);
                if resident.is_none() { warn!(route_id, "skipping resident document without id") }
                resident
            })
            .collect())
    }

    async fn persist_position(&self, driver_id: &str, sample: &PositionSample) -> Result<()> {
        self.enter().await?;
        lock(&self.positions).push((driver_id.to_string(), sample.clone()));
        Ok(())
    }

    async fn all_addresses(&self) -> Result<Vec<Address>> {
        self.enter().await?;
        Ok(lock(&self.addresses).iter().filter_map(Address::from_document).collect())
    }
}

/// Notifier that records every delivery instead of pushing it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, NotificationEvent)>>,
    failing: Mutex<AHashSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self { Self::default() }

    /// Make every send to `handle` fail with `Dispatch`.
    pub fn fail_for(&self, handle: &str) { lock(&self.failing).insert(handle.to_string()); }

    /// Delivered `(handle, event)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, NotificationEvent)> { lock(&self.sent).clone() }

    /// Number of deliveries to `resident_id`.
    pub fn count_for(&self, resident_id: &str) -> usize {
        lock(&self.sent).iter().filter(|(_, event)| event.resident_id == resident_id).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, handle: &str, event: &NotificationEvent) -> Result<()> {
        if lock(&self.failing).contains(handle) {
            return Err(Error::Dispatch(format!("handle {handle} rejected")));
        }
        lock(&self.sent).push((handle.to_string(), event.clone()));
        Ok(())
    }
}
