mod cluster;
mod distance;
mod enricher;
mod filter;
mod identity;
mod length;
mod projector;
mod resolver;

pub use cluster::{apply_clusters, find_clusters, merge_pairs, ClusterFamily, Clustering, EndpointCluster};
pub use distance::{
    endpoint_index, endpoint_slot, DistanceMatrix, EndpointIndex, EndpointPair, PairSource,
    SELF_DISTANCE,
};
pub use enricher::{enrich, parse_voltage, Enriched, VoltageLevels};
pub use filter::{dc_reasons, filter, system_count, Filtered};
pub use identity::{assign_identities, Export, LineRecord, NodeRecord};
pub use length::{real_lengths, LengthDeviation, LengthReport};
pub use projector::Projection;
pub use resolver::{resolve, Resolved};
