use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    address::{Address, AddressGroup},
    config::ScoringParams,
    geomath::{self, GeoPoint},
    Error, Result,
};

/// What a dispatcher wants a route list optimized for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Fastest,
    #[default]
    Efficient,
    MostUsers,
    FuelSaving,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [Self::Fastest, Self::Efficient, Self::MostUsers, Self::FuelSaving];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::Efficient => "efficient",
            Self::MostUsers => "most_users",
            Self::FuelSaving => "fuel_saving",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Criterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().replace('-', "_");
        Self::ALL.into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&name))
            .ok_or_else(|| Error::InvalidInput(format!("unknown criterion '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority { Low, Medium, High }

/// A scored collection route: a street group plus its estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCluster {
    pub key: String,
    pub name: String,
    pub representative_street: String,
    pub neighborhood: String,
    pub members: Vec<Address>,
    /// Score in [0, 100] under the criterion it was last scored with.
    pub efficiency_score: f64,
    pub distance_km: f64,
    pub duration_min: f64,
    pub fuel_saving_pct: f64,
    pub priority: Priority,
    /// Mean of the members' known coordinates, for map framing.
    pub center: Option<GeoPoint>,
    pub zoom: u8,
}

impl RouteCluster {
    #[inline] pub fn member_count(&self) -> usize { self.members.len() }

    /// Stops per kilometre.
    #[inline] pub fn density(&self) -> f64 { self.members.len() as f64 / self.distance_km }
}

// Weights of the blended `efficient` score.
const EFFICIENT_MEMBER_WEIGHT: f64 = 30.0;
const EFFICIENT_MEMBER_SCALE: f64 = 30.0;
const EFFICIENT_DISTANCE_BUDGET: f64 = 40.0;
const EFFICIENT_DISTANCE_PENALTY: f64 = 2.0;
const EFFICIENT_DENSITY_WEIGHT: f64 = 10.0;

const FASTEST_KM_PER_STOP_PENALTY: f64 = 10.0;
const FUEL_DENSITY_WEIGHT: f64 = 20.0;

/// Flat distance estimate: a fixed base plus a per-stop cost. Not routed distance.
#[inline]
fn estimate_distance_km(members: usize, params: &ScoringParams) -> f64 {
    params.base_km + params.km_per_stop * members as f64
}

/// Travel time at the average speed plus dwell at each stop.
#[inline]
fn estimate_duration_min(distance_km: f64, members: usize, params: &ScoringParams) -> f64 {
    distance_km / params.speed_kmh * 60.0 + members as f64 * params.dwell_min_per_stop
}

/// Percent of distance saved against an unplanned route that drives `baseline_overhead` more.
#[inline]
fn estimate_fuel_saving_pct(distance_km: f64, params: &ScoringParams) -> f64 {
    let baseline = distance_km * (1.0 + params.baseline_overhead);
    ((baseline - distance_km) / baseline * 100.0).round()
}

/// Score in [0, 100] for `members` stops over `distance_km` under `criterion`.
pub fn efficiency_score(criterion: Criterion, members: usize, distance_km: f64, params: &ScoringParams) -> f64 {
    let m = members as f64;
    let score = match criterion {
        Criterion::MostUsers => m / params.full_route_members * 100.0,
        Criterion::Fastest => 100.0 - (distance_km / m) * FASTEST_KM_PER_STOP_PENALTY,
        Criterion::FuelSaving => (m / distance_km) * FUEL_DENSITY_WEIGHT,
        Criterion::Efficient => {
            EFFICIENT_MEMBER_WEIGHT * (m / EFFICIENT_MEMBER_SCALE)
                + (EFFICIENT_DISTANCE_BUDGET - EFFICIENT_DISTANCE_PENALTY * distance_km).max(0.0)
                + EFFICIENT_DENSITY_WEIGHT * (m / distance_km)
        }
    };

    if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) }
}

fn priority(members: usize, density: f64, params: &ScoringParams) -> Priority {
    if members > params.high_priority_members || density > params.high_priority_density {
        Priority::High
    } else if members > params.medium_priority_members || density > params.medium_priority_density {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Turn a street group into a scored route. Fails with `EmptyInput` on an empty group.
pub fn score_cluster(group: AddressGroup, criterion: Criterion, params: &ScoringParams) -> Result<RouteCluster> {
    if group.members.is_empty() { return Err(Error::EmptyInput) }

    let members = group.members.len();
    let distance_km = estimate_distance_km(members, params);
    let coords: Vec<GeoPoint> = group.members.iter().filter_map(|a| a.coords).collect();

    Ok(RouteCluster {
        name: format!("Ruta {} - {}", group.representative_street.trim(), group.neighborhood.trim()),
        key: group.key,
        representative_street: group.representative_street,
        neighborhood: group.neighborhood,
        efficiency_score: efficiency_score(criterion, members, distance_km, params),
        distance_km,
        duration_min: estimate_duration_min(distance_km, members, params),
        fuel_saving_pct: estimate_fuel_saving_pct(distance_km, params),
        priority: priority(members, members as f64 / distance_km, params),
        center: geomath::centroid(&coords),
        zoom: geomath::zoom_level(&coords),
        members: group.members,
    })
}

/// Re-score every route under `criterion` and order them best first.
///
/// `most_users` sorts by descending member count, `fastest` by ascending
/// duration, `fuel_saving` by descending fuel saving and `efficient` by
/// descending efficiency. The sort is stable, so ties keep their input order.
pub fn score_and_sort(mut routes: Vec<RouteCluster>, criterion: Criterion, params: &ScoringParams) -> Vec<RouteCluster> {
    for route in &mut routes {
        route.efficiency_score = efficiency_score(criterion, route.member_count(), route.distance_km, params);
    }

    match criterion {
        Criterion::MostUsers => routes.sort_by(|a, b| b.member_count().cmp(&a.member_count())),
        Criterion::Fastest => routes.sort_by(|a, b| a.duration_min.total_cmp(&b.duration_min)),
        Criterion::FuelSaving => routes.sort_by(|a, b| b.fuel_saving_pct.total_cmp(&a.fuel_saving_pct)),
        Criterion::Efficient => routes.sort_by(|a, b| b.efficiency_score.total_cmp(&a.efficiency_score)),
    }

    routes
}
