use crate::error::RecordIssue;
use geo_types::{LineString, Point};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

pub type Tags = BTreeMap<String, String>;

/// A point record as delivered by the parsing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
}

impl Node {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// A polyline record as delivered by the parsing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWay {
    pub id: i64,
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: Tags,
}

/// A raw way accepted at ingestion together with its stable source identity
/// and its resolved first and last member.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWay {
    pub uid: u64,
    pub way: RawWay,
    pub ends: [Node; 2],
}

/// The static input of one pipeline run.
///
/// Ways with fewer than two members or whose first or last member is
/// missing from the node set are dropped here. Interior members are not
/// checked; a way with a gap only loses its polyline length.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    nodes: HashMap<i64, Node>,
    ways: Vec<SourceWay>,
    dropped: usize,
}

impl Dataset {
    pub fn new(nodes: Vec<Node>, ways: Vec<RawWay>) -> Self {
        let mut dropped = 0;
        let mut node_map = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if !node.lon.is_finite() || !node.lat.is_finite() {
                warn!(node = node.id, "dropping node with non-finite coordinates");
                dropped += 1;
                continue;
            }
            if node_map.contains_key(&node.id) {
                warn!(node = node.id, "dropping duplicate node record");
                dropped += 1;
                continue;
            }
            node_map.insert(node.id, node);
        }

        let mut accepted = Vec::with_capacity(ways.len());
        for way in ways {
            if way.nodes.len() < 2 {
                warn!(way = way.id, members = way.nodes.len(), "dropping way with fewer than two nodes");
                dropped += 1;
                continue;
            }
            let (first, last) = (way.nodes[0], way.nodes[way.nodes.len() - 1]);
            let ends = match (node_map.get(&first), node_map.get(&last)) {
                (Some(first), Some(last)) => [*first, *last],
                _ => {
                    let issue = RecordIssue::StructuralMismatch {
                        detail: format!("endpoint node {first} or {last} is unknown"),
                    };
                    warn!(way = way.id, %issue, "dropping way");
                    dropped += 1;
                    continue;
                }
            };
            let uid = accepted.len() as u64 + 1;
            accepted.push(SourceWay { uid, way, ends });
        }
        debug!(
            nodes = node_map.len(),
            ways = accepted.len(),
            dropped,
            "dataset ingested"
        );

        Dataset {
            nodes: node_map,
            ways: accepted,
            dropped,
        }
    }

    /// Adds records that never reached [`Dataset::new`] because they could
    /// not be decoded.
    pub fn with_decode_failures(mut self, count: usize) -> Self {
        self.dropped += count;
        self
    }

    pub fn node(&self, id: i64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn ways(&self) -> &[SourceWay] {
        &self.ways
    }

    pub fn way_by_uid(&self, uid: u64) -> Option<&SourceWay> {
        let index = usize::try_from(uid).ok()?.checked_sub(1)?;
        self.ways.get(index)
    }

    /// Number of structurally inconsistent records dropped before the core.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    /// The original, unfiltered member sequence of a way as lon/lat
    /// coordinates, or `None` if an interior member is unknown.
    pub fn polyline(&self, uid: u64) -> Option<LineString<f64>> {
        let source = self.way_by_uid(uid)?;
        source
            .way
            .nodes
            .iter()
            .map(|id| self.node(*id).map(|node| (node.lon, node.lat)))
            .collect::<Option<Vec<_>>>()
            .map(LineString::from)
    }

    /// Lon/lat of both endpoints of every accepted way.
    pub fn endpoint_points(&self) -> Vec<Point<f64>> {
        self.ways
            .iter()
            .flat_map(|source| source.ends.map(|node| node.point()))
            .collect()
    }
}
