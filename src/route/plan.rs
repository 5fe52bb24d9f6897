use tracing::info;

use crate::{
    address::{cluster_addresses, Address},
    config::ScoringParams,
    route::{score_and_sort, score_cluster, Criterion, RouteCluster},
    store::Store,
    Result,
};

/// Group `addresses` into street routes and score each with the default criterion.
///
/// Routes come back in discovery order; use [`score_and_sort`] to rank them.
pub fn cluster_routes(addresses: &[Address], threshold: f64, params: &ScoringParams) -> Result<Vec<RouteCluster>> {
    cluster_addresses(addresses, threshold)?
        .into_iter()
        .map(|group| score_cluster(group, Criterion::default(), params))
        .collect()
}

/// Build a ranked route plan from every address in the store.
pub async fn plan_routes(
    store: &dyn Store,
    threshold: f64,
    criterion: Criterion,
    params: &ScoringParams,
) -> Result<Vec<RouteCluster>> {
    let addresses = store.all_addresses().await?;
    let routes = score_and_sort(cluster_routes(&addresses, threshold, params)?, criterion, params);

    info!(addresses = addresses.len(), routes = routes.len(), %criterion, "planned routes");
    Ok(routes)
}
