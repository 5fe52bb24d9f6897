mod cluster;
mod normalize;
mod similarity;
mod types;

pub use cluster::{cluster_addresses, AddressGroup, DEFAULT_SIMILARITY_THRESHOLD};
pub use normalize::normalize_street;
pub use similarity::{levenshtein, similarity};
pub use types::Address;
