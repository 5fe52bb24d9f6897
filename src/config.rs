use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Error, Result};

/// Reads a JSON config file at `path`, falling back to defaults for missing fields.
pub fn read_json_config<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// How often a position source should emit: whichever trigger fires first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cadence {
    pub interval_secs: u64,
    pub min_distance_m: f64,
}

impl Default for Cadence {
    fn default() -> Self { Self { interval_secs: 30, min_distance_m: 10.0 } }
}

impl Cadence {
    #[inline] pub fn interval(&self) -> Duration { Duration::from_secs(self.interval_secs) }
}

/// Tuning for tracking sessions and proximity alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// A resident closer than this (meters) gets a "truck nearby" alert.
    pub notify_radius_m: f64,
    /// A notified resident farther than this (meters) is re-armed.
    pub rearm_radius_m: f64,
    pub cadence: Cadence,
    /// Upper bound on any single store or notifier call.
    pub io_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            notify_radius_m: 100.0,
            rearm_radius_m: 200.0,
            cadence: Cadence::default(),
            io_timeout_ms: 5_000,
        }
    }
}

impl TrackerConfig {
    #[inline] pub fn io_timeout(&self) -> Duration { Duration::from_millis(self.io_timeout_ms) }

    /// Check that the hysteresis band and timeouts make sense.
    pub fn validate(&self) -> Result<()> {
        if !(self.notify_radius_m > 0.0 && self.notify_radius_m < self.rearm_radius_m) {
            return Err(Error::InvalidInput(format!(
                "notify radius {} must be positive and below re-arm radius {}",
                self.notify_radius_m, self.rearm_radius_m
            )));
        }
        if self.io_timeout_ms == 0 {
            return Err(Error::InvalidInput("io timeout must be positive".into()));
        }
        if !(self.cadence.min_distance_m >= 0.0) {
            return Err(Error::InvalidInput("cadence distance must be non-negative".into()));
        }
        Ok(())
    }

    /// Load and validate a tracker config from a JSON file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let config: Self = read_json_config(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Constants behind the route estimates.
///
/// These are uncalibrated field heuristics (average collection speed, stop
/// dwell, waste of an unplanned route) rather than measured values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringParams {
    /// Fixed distance of any route, km.
    pub base_km: f64,
    /// Added distance per stop, km.
    pub km_per_stop: f64,
    /// Average truck speed while collecting, km/h.
    pub speed_kmh: f64,
    /// Time spent at each stop, minutes.
    pub dwell_min_per_stop: f64,
    /// Extra distance an unplanned route drives, as a fraction (0.3 = 30%).
    pub baseline_overhead: f64,
    /// Member count at which a route counts as full for `most_users`.
    pub full_route_members: f64,
    pub high_priority_members: usize,
    pub high_priority_density: f64,
    pub medium_priority_members: usize,
    pub medium_priority_density: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_km: 1.0,
            km_per_stop: 0.5,
            speed_kmh: 20.0,
            dwell_min_per_stop: 2.0,
            baseline_overhead: 0.3,
            full_route_members: 50.0,
            high_priority_members: 20,
            high_priority_density: 10.0,
            medium_priority_members: 10,
            medium_priority_density: 5.0,
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("baseKm", self.base_km),
            ("speedKmh", self.speed_kmh),
            ("fullRouteMembers", self.full_route_members),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("kmPerStop", self.km_per_stop),
            ("dwellMinPerStop", self.dwell_min_per_stop),
            ("baselineOverhead", self.baseline_overhead),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidInput(format!("{name} must be non-negative, got {value}")));
            }
        }
        Ok(())
    }

    /// Load and validate scoring parameters from a JSON file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let params: Self = read_json_config(path)?;
        params.validate()?;
        Ok(params)
    }
}
