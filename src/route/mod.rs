mod plan;
mod score;

pub use plan::{cluster_routes, plan_routes};
pub use score::{efficiency_score, score_and_sort, score_cluster, Criterion, Priority, RouteCluster};
