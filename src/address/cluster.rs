use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    address::{normalize_street, similarity, Address},
    Error, Result,
};

/// Minimum normalized-street similarity for two addresses to share a route.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// A group of addresses that share a (fuzzy) street within one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressGroup {
    /// `normalized_street + "_" + neighborhood` (lowercased), unique per grouping run.
    pub key: String,
    pub normalized_street: String,
    /// Street text of the address that seeded the group, as entered.
    pub representative_street: String,
    /// Neighborhood of the seed address, as entered.
    pub neighborhood: String,
    pub members: Vec<Address>,
}

impl AddressGroup {
    #[inline] pub fn len(&self) -> usize { self.members.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

/// Case-insensitive neighborhood key.
#[inline]
fn neighborhood_key(neighborhood: &str) -> String { neighborhood.trim().to_lowercase() }

/// Partition `addresses` into street groups.
///
/// Single pass and greedy: each unvisited address seeds a group and claims
/// every later unvisited address in the same neighborhood whose normalized
/// street scores at least `threshold` against the seed. Claimed addresses are
/// never reconsidered, so the result depends on input order and is not a
/// globally optimal clustering. Groups come back in seed order, are disjoint
/// and together hold every input address exactly once.
pub fn cluster_addresses(addresses: &[Address], threshold: f64) -> Result<Vec<AddressGroup>> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidInput(format!("similarity threshold {threshold} outside [0, 1]")));
    }

    let streets: Vec<String> = addresses.iter().map(|a| normalize_street(&a.street)).collect();
    let neighborhoods: Vec<String> = addresses.iter().map(|a| neighborhood_key(&a.neighborhood)).collect();

    let mut visited = vec![false; addresses.len()];
    let mut groups = Vec::new();

    for seed in 0..addresses.len() {
        if visited[seed] { continue }
        visited[seed] = true;

        let mut members = vec![addresses[seed].clone()];
        for other in seed + 1..addresses.len() {
            if visited[other] || neighborhoods[other] != neighborhoods[seed] { continue }
            if similarity(&streets[seed], &streets[other]) >= threshold {
                visited[other] = true;
                members.push(addresses[other].clone());
            }
        }

        groups.push(AddressGroup {
            key: format!("{}_{}", streets[seed], neighborhoods[seed]),
            normalized_street: streets[seed].clone(),
            representative_street: addresses[seed].street.clone(),
            neighborhood: addresses[seed].neighborhood.clone(),
            members,
        });
    }

    debug!(addresses = addresses.len(), groups = groups.len(), threshold, "clustered addresses");
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use ahash::AHashSet;

    use super::*;

    fn addr(street: &str, number: &str, neighborhood: &str) -> Address {
        Address::new(street, number, neighborhood)
    }

    #[test]
    fn juarez_scenario_yields_two_groups() {
        let addresses = [
            addr("Av Juarez", "1", "Centro"),
            addr("avenida juarez", "2", "Centro"),
            addr("Calle 5", "3", "Centro"),
        ];
        let groups = cluster_addresses(&addresses, DEFAULT_SIMILARITY_THRESHOLD).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "avenida juarez_centro");
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].representative_street, "Av Juarez");
        assert_eq!(groups[1].key, "calle 5_centro");
    }

    #[test]
    fn output_is_a_partition() {
        let addresses = [
            addr("Av Juarez", "1", "Centro"),
            addr("Calle 5", "2", "Centro"),
            addr("Av. Juárez", "3", "Centro"),
            addr("Calle 6", "4", "Centro"),
            addr("Av Juarez", "5", "Roma"),
            addr("Privada Olmos", "6", "Roma"),
            addr("priv olmos", "7", "roma"),
        ];
        let groups = cluster_addresses(&addresses, 0.8).unwrap();

        let mut seen = AHashSet::new();
        for member in groups.iter().flat_map(|g| &g.members) {
            assert!(seen.insert(member.number.clone()), "address {} appears twice", member.number);
        }
        assert_eq!(seen.len(), addresses.len());

        let keys: AHashSet<_> = groups.iter().map(|g| g.key.clone()).collect();
        assert_eq!(keys.len(), groups.len());
    }

    #[test]
    fn same_normalized_street_and_neighborhood_always_merge() {
        let addresses = [
            addr("Calle de la Luz", "1", "Centro"),
            addr("Calle 5", "2", "Centro"),
            addr("C. Luz", "3", "CENTRO"),
            addr("calle luz", "4", " centro "),
        ];
        let groups = cluster_addresses(&addresses, 1.0).unwrap();
        let luz = groups.iter().find(|g| g.normalized_street == "calle luz").unwrap();
        assert_eq!(luz.len(), 3);
    }

    #[test]
    fn different_neighborhoods_never_merge() {
        let addresses = [addr("Av Juarez", "1", "Centro"), addr("Av Juarez", "2", "Roma")];
        let groups = cluster_addresses(&addresses, 0.0).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn below_threshold_never_merges() {
        // "calle 5" vs "calle 6": similarity 6/7 ~ 0.857
        let addresses = [addr("Calle 5", "1", "Centro"), addr("Calle 6", "2", "Centro")];
        assert_eq!(cluster_addresses(&addresses, 0.9).unwrap().len(), 2);
        assert_eq!(cluster_addresses(&addresses, 0.85).unwrap().len(), 1);
    }

    #[test]
    fn greedy_first_match_wins() {
        // B is close to both A and C, but A seeds first and claims it; C is too far from A.
        let addresses = [
            addr("calle abcdefgh", "a", "x"),
            addr("calle abcdefgz", "b", "x"),
            addr("calle abcdefyz", "c", "x"),
        ];
        let groups = cluster_addresses(&addresses, 0.9).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members.iter().map(|m| m.number.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(groups[1].members[0].number, "c");
    }

    #[test]
    fn rejects_bad_threshold_and_accepts_empty_input() {
        assert!(matches!(cluster_addresses(&[], 1.5), Err(Error::InvalidInput(_))));
        assert!(matches!(cluster_addresses(&[], f64::NAN), Err(Error::InvalidInput(_))));
        assert!(cluster_addresses(&[], 0.8).unwrap().is_empty());
    }
}
