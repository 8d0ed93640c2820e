use crate::{
    config::Config,
    model::{CoordKey, Slot, Way},
    util::round_to,
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

const SYSTEM_SUFFIXES: [char; 4] = ['a', 'b', 'c', 'd'];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRecord {
    #[serde(rename = "LineID")]
    pub line_id: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "FromNode")]
    pub from_node: String,
    #[serde(rename = "ToNode")]
    pub to_node: String,
    #[serde(rename = "VoltageKV")]
    pub voltage_kv: f64,
    #[serde(rename = "R")]
    pub r: f64,
    #[serde(rename = "XL")]
    pub xl: f64,
    #[serde(rename = "XC")]
    pub xc: f64,
    #[serde(rename = "Itherm")]
    pub itherm: f64,
    #[serde(rename = "LengthKM")]
    pub length_km: f64,
    #[serde(rename = "Capacity")]
    pub capacity: f64,
    #[serde(rename = "Note")]
    pub note: String,
    #[serde(rename = "PhiPsMax")]
    pub phi_ps_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    #[serde(rename = "NodeID")]
    pub node_id: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "VoltageKV")]
    pub voltage_kv: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

/// The line and node tables handed to the export collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Export {
    pub lines: Vec<LineRecord>,
    pub nodes: Vec<NodeRecord>,
}

/// Numbers lines in their current order and derives one node per
/// (resolved coordinate, voltage) pair.
///
/// A way carrying several systems is exported once per system; the copies
/// share the base identifier and differ by a letter suffix.
pub fn assign_identities(ways: &[Way], config: &Config) -> Export {
    let country = config.country_code.to_uppercase();
    let mut node_ids: HashMap<(CoordKey, u64), String> = HashMap::new();
    let mut export = Export::default();

    for (counter, way) in ways.iter().enumerate() {
        let [from_node, to_node] = Slot::BOTH.map(|slot| {
            let position = way.endpoint(slot).position();
            node_ids
                .entry((position.key(), way.voltage.to_bits()))
                .or_insert_with(|| {
                    let node_id = format!("{country}{:05}", export.nodes.len() + 1);
                    export.nodes.push(NodeRecord {
                        node_id: node_id.clone(),
                        country: country.clone(),
                        voltage_kv: way.voltage / 1000.,
                        latitude: position.lat,
                        longitude: position.lon,
                    });
                    node_id
                })
                .clone()
        });

        let base_id = format!("{country}{:04}", counter + 1);
        let length_km = round_to(way.length() * config.length_slack_multiplier, 2);
        let note = note(way);
        let line_count = way.line_count();
        for system in 0..line_count {
            let line_id = if line_count > 1 {
                format!("{base_id}{}", SYSTEM_SUFFIXES[system])
            } else {
                base_id.clone()
            };
            export.lines.push(LineRecord {
                line_id,
                country: country.clone(),
                from_node: from_node.clone(),
                to_node: to_node.clone(),
                voltage_kv: way.voltage / 1000.,
                r: 0.,
                xl: 0.,
                xc: 0.,
                itherm: 0.,
                length_km,
                capacity: 0.,
                note: note.clone(),
                phi_ps_max: 0.,
            });
        }
    }

    info!(
        ways = ways.len(),
        lines = export.lines.len(),
        nodes = export.nodes.len(),
        "assigned identifiers"
    );
    export
}

fn note(way: &Way) -> String {
    let mut parts = vec![format!("UID:{}", way.uid)];
    if way.is_multi_voltage() {
        parts.push(format!("voltage split {}", way.voltage_levels));
    }
    if way.line_count() > 1 {
        parts.push(format!("{} systems", way.line_count()));
    }
    if way.is_dc_candidate() {
        parts.push(format!("DC candidate ({})", way.dc_reasons.iter().join(", ")));
    }
    parts.join(" | ")
}
