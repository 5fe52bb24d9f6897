// Integration tests for address clustering and route scoring through the
// public API: normalization keys, partition properties, scoring ranges, and
// ranking by criterion.

use binroute::{
    cluster_addresses, cluster_routes, distance_meters, normalize_street, score_and_sort, similarity, Address,
    Criterion, GeoPoint, ScoringParams,
};

fn neighborhood_block(street: &str, neighborhood: &str, count: usize, first: usize) -> Vec<Address> {
    (first..first + count).map(|n| Address::new(street, n.to_string(), neighborhood)).collect()
}

#[test]
fn accented_abbreviated_street_matches_plain_form() {
    assert_eq!(normalize_street("Av. Juárez Juárez"), normalize_street("avenida juarez"));
}

#[test]
fn distance_is_symmetric_and_zero_on_identity() {
    let points = [
        GeoPoint::new(19.4326, -99.1332).unwrap(),
        GeoPoint::new(25.6866, -100.3161).unwrap(),
        GeoPoint::new(-12.0464, -77.0428).unwrap(),
    ];
    for a in &points {
        assert_eq!(distance_meters(a, a), 0.0);
        for b in &points {
            assert_eq!(distance_meters(a, b), distance_meters(b, a));
            assert!(distance_meters(a, b) >= 0.0);
        }
    }
}

#[test]
fn juarez_scenario() {
    let addresses = [
        Address::new("Av Juarez", "", "Centro"),
        Address::new("avenida juarez", "", "Centro"),
        Address::new("Calle 5", "", "Centro"),
    ];
    assert_eq!(cluster_addresses(&addresses, 0.8).unwrap().len(), 2);
}

#[test]
fn clustering_is_a_partition_within_threshold() {
    let mut addresses = Vec::new();
    for (i, street) in ["Calle Hidalgo", "Calle Hidalga", "Calle Morelos", "Av. Morelos", "Priv. Olmos", "Calle Allende"].iter().enumerate() {
        addresses.extend(neighborhood_block(street, if i % 2 == 0 { "Centro" } else { "Norte" }, 3, i * 10));
        addresses.extend(neighborhood_block(street, "Centro", 2, i * 10 + 5));
    }

    let threshold = 0.8;
    let groups = cluster_addresses(&addresses, threshold).unwrap();

    // every address lands in exactly one group
    let total: usize = groups.iter().map(|g| g.len()).sum();
    assert_eq!(total, addresses.len());

    // members agree with their seed on neighborhood and clear the threshold
    for group in &groups {
        for member in &group.members {
            assert_eq!(member.neighborhood.to_lowercase(), group.neighborhood.to_lowercase());
            assert!(similarity(&group.normalized_street, &normalize_street(&member.street)) >= threshold);
        }
    }
}

#[test]
fn scores_stay_in_range_and_ranking_follows_criterion() {
    let mut addresses = neighborhood_block("Calle Hidalgo", "Centro", 25, 0);
    addresses.extend(neighborhood_block("Calle Morelos", "Centro", 4, 100));
    addresses.extend(neighborhood_block("Privada Olmos", "Norte", 12, 200));

    let params = ScoringParams::default();
    let routes = cluster_routes(&addresses, 0.8, &params).unwrap();
    assert_eq!(routes.len(), 3);

    for criterion in Criterion::ALL {
        let ranked = score_and_sort(routes.clone(), criterion, &params);
        assert!(ranked.iter().all(|r| (0.0..=100.0).contains(&r.efficiency_score)));

        let counts: Vec<usize> = ranked.iter().map(|r| r.member_count()).collect();
        match criterion {
            Criterion::MostUsers => assert_eq!(counts, [25, 12, 4]),
            Criterion::Fastest => assert_eq!(counts, [4, 12, 25]),
            _ => {}
        }
    }
}

#[test]
fn route_json_uses_camel_case() {
    let routes = cluster_routes(&[Address::new("Calle 5", "1", "Centro")], 0.8, &ScoringParams::default()).unwrap();
    let value = serde_json::to_value(&routes[0]).unwrap();
    assert_eq!(value["representativeStreet"], "Calle 5");
    assert_eq!(value["priority"], "low");
    assert!(value["efficiencyScore"].is_number());
}
