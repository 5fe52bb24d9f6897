#![doc = "Binroute public API: route clustering and live truck proximity alerts"]
mod address;
mod config;
mod error;
mod geomath;
mod route;
mod store;
mod tracking;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use config::{read_json_config, Cadence, ScoringParams, TrackerConfig};

#[doc(inline)]
pub use geomath::{
    bounding_box, centroid, distance_meters, zoom_level, BoundingBox, GeoPoint, DEFAULT_ZOOM, EARTH_RADIUS_M, SINGLE_POINT_ZOOM,
};

#[doc(inline)]
pub use address::{
    cluster_addresses, levenshtein, normalize_street, similarity, Address, AddressGroup, DEFAULT_SIMILARITY_THRESHOLD,
};

#[doc(inline)]
pub use route::{cluster_routes, efficiency_score, plan_routes, score_and_sort, score_cluster, Criterion, Priority, RouteCluster};

#[doc(inline)]
pub use store::{MemoryStore, NotificationEvent, Notifier, RecordingNotifier, Resident, Store};

#[doc(inline)]
pub use tracking::{
    Assignment, CadenceFilter, ChannelSource, PositionSample, PositionSource, ProximityNotifier, ProximityReport,
    ProximityState, ReplaySource, SessionSnapshot, SessionStatus, Subscription, TrackingSession, Transition,
};
