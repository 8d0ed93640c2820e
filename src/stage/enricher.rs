use super::Projection;
use crate::{
    error::RecordIssue,
    model::{Dataset, Endpoint, Slot, SourceWay, Tags, Way, WayRef},
    util::planar_distance,
};
use itertools::Itertools;
use tracing::{debug, info, warn};

/// Most voltage levels a single way may be split into.
const MAX_VOLTAGE_LEVELS: usize = 3;

/// Outcome of reading the `voltage` tag of one way.
#[derive(Debug, Clone, PartialEq)]
pub enum VoltageLevels {
    Single(f64),
    /// The way is cloned once per level.
    Multiple(Vec<f64>),
    Excluded(RecordIssue),
}

/// Parses the `voltage` tag as a number, falling back to a `;` separated list.
pub fn parse_voltage(tags: &Tags) -> VoltageLevels {
    let Some(raw) = tags.get("voltage") else {
        return VoltageLevels::Excluded(RecordIssue::missing("voltage"));
    };
    if let Some(value) = parse_number(raw) {
        return VoltageLevels::Single(value);
    }
    let values = raw
        .split(';')
        .filter_map(parse_number)
        .collect_vec();
    match values.len() {
        0 => VoltageLevels::Excluded(RecordIssue::parse("voltage", raw)),
        1 => VoltageLevels::Single(values[0]),
        count if count <= MAX_VOLTAGE_LEVELS => VoltageLevels::Multiple(values),
        count => VoltageLevels::Excluded(RecordIssue::UnsupportedVoltageCount { count }),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Default)]
pub struct Enriched {
    pub ways: Vec<Way>,
    pub excluded: Vec<(WayRef, RecordIssue)>,
}

/// Attaches projected endpoints and beeline length to every source way and
/// splits multi-voltage ways into one clone per level.
pub fn enrich(dataset: &Dataset, projection: &Projection) -> Enriched {
    let mut excluded = Vec::new();

    // Decide the expansion of every way first, then build the clones.
    let plan = dataset
        .ways()
        .iter()
        .filter_map(|source| {
            let levels = match parse_voltage(&source.way.tags) {
                VoltageLevels::Single(voltage) => vec![voltage],
                VoltageLevels::Multiple(voltages) => {
                    debug!(way = source.way.id, levels = voltages.len(), "splitting multi-voltage way");
                    voltages
                }
                VoltageLevels::Excluded(issue) => {
                    warn!(way = source.way.id, uid = source.uid, %issue, "excluding way");
                    let reference = WayRef {
                        id: source.way.id,
                        uid: source.uid,
                    };
                    excluded.push((reference, issue));
                    return None;
                }
            };
            Some((source, resolve_endpoints(source, projection), levels))
        })
        .collect_vec();

    let ways = plan
        .into_iter()
        .flat_map(|(source, endpoints, levels)| {
            let straight_length = planar_distance(
                endpoints[Slot::First.index()].raw.planar(),
                endpoints[Slot::Second.index()].raw.planar(),
            );
            let voltage_levels = levels.len();
            levels.into_iter().map(move |voltage| Way {
                id: source.way.id,
                uid: source.uid,
                nodes: source.way.nodes.clone(),
                tags: source.way.tags.clone(),
                voltage,
                voltage_levels,
                endpoints,
                straight_length,
                real_length: None,
                dc_reasons: Vec::new(),
                system_count: None,
            })
        })
        .collect_vec();

    info!(
        sources = dataset.ways().len(),
        ways = ways.len(),
        excluded = excluded.len(),
        "resolved voltages"
    );
    Enriched { ways, excluded }
}

fn resolve_endpoints(source: &SourceWay, projection: &Projection) -> [Endpoint; 2] {
    source
        .ends
        .map(|node| Endpoint::new(node.id, projection.position(node.point())))
}
