use super::{endpoint_slot, EndpointPair, PairSource, Projection};
use crate::{
    algorithm::DisjointSet,
    model::{Position, Slot, Way},
    util::mean_point,
};
use serde::Serialize;
use tracing::{debug, info};

/// The two independent merge criteria for endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterFamily {
    /// Exactly coincident endpoints.
    Stacked,
    /// Endpoints closer than the neighbourhood threshold, but not coincident.
    Neighbourhood,
}

impl ClusterFamily {
    fn radius(self, threshold: f64) -> f64 {
        match self {
            ClusterFamily::Stacked => 0.,
            ClusterFamily::Neighbourhood => threshold,
        }
    }

    pub fn admits(self, distance: f64, threshold: f64) -> bool {
        match self {
            ClusterFamily::Stacked => distance == 0.,
            ClusterFamily::Neighbourhood => distance > 0. && distance < threshold,
        }
    }
}

/// Endpoint indices believed to be one physical point, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCluster {
    pub members: Vec<usize>,
}

impl EndpointCluster {
    pub fn endpoints(&self) -> impl Iterator<Item = (usize, Slot)> + '_ {
        self.members.iter().map(|index| endpoint_slot(*index))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clustering {
    pub stacked: Vec<EndpointCluster>,
    pub neighbourhood: Vec<EndpointCluster>,
}

impl Clustering {
    pub fn family(&self, family: ClusterFamily) -> &[EndpointCluster] {
        match family {
            ClusterFamily::Stacked => &self.stacked,
            ClusterFamily::Neighbourhood => &self.neighbourhood,
        }
    }
}

/// Maximal connected groups of the given pairs.
pub fn merge_pairs(endpoint_count: usize, pairs: &[EndpointPair]) -> Vec<EndpointCluster> {
    let mut sets = DisjointSet::new(endpoint_count);
    let merges = pairs.iter().filter(|pair| sets.union(pair.a, pair.b)).count();
    debug!(pairs = pairs.len(), merges, "merged endpoint pairs");
    sets.groups(2)
        .into_iter()
        .map(|members| EndpointCluster { members })
        .collect()
}

pub fn find_clusters<S: PairSource>(source: &S, threshold: f64) -> Clustering {
    let run = |family: ClusterFamily| {
        let pairs = source.pairs_where(family.radius(threshold), |distance| {
            family.admits(distance, threshold)
        });
        merge_pairs(source.endpoint_count(), &pairs)
    };
    let clustering = Clustering {
        stacked: run(ClusterFamily::Stacked),
        neighbourhood: run(ClusterFamily::Neighbourhood),
    };
    info!(
        stacked = clustering.stacked.len(),
        neighbourhood = clustering.neighbourhood.len(),
        "clustered endpoints"
    );
    clustering
}

/// Writes the grouped coordinate of every clustered endpoint.
///
/// Stacked members all take the raw coordinate of the first member.
/// Neighbourhood members take the mean of their raw coordinates, projected
/// with the shared factors. Neighbourhood groups are applied last, so an
/// endpoint in both families ends up on the mean.
pub fn apply_clusters(mut ways: Vec<Way>, clustering: &Clustering, projection: &Projection) -> Vec<Way> {
    for cluster in &clustering.stacked {
        let Some((way, slot)) = cluster.endpoints().next() else {
            continue;
        };
        let position = ways[way].endpoint(slot).raw;
        assign(&mut ways, cluster, position);
    }
    for cluster in &clustering.neighbourhood {
        let mean = mean_point(
            cluster
                .endpoints()
                .map(|(way, slot)| ways[way].endpoint(slot).raw.geo()),
        );
        if let Some(mean) = mean {
            assign(&mut ways, cluster, projection.position(mean));
        }
    }
    ways
}

fn assign(ways: &mut [Way], cluster: &EndpointCluster, position: Position) {
    for (way, slot) in cluster.endpoints() {
        ways[way].endpoint_mut(slot).grouped = Some(position);
    }
}
