use crate::{
    error::RecordIssue,
    model::{DcReason, Tags, Way, WayRef},
};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct Filtered {
    /// Ways that remain part of the transmission topology.
    pub ways: Vec<Way>,
    /// Short busbars and bays taken out of the topology.
    pub busbars: Vec<Way>,
    /// Busbars and bays kept because they exceed the length limit.
    pub oversized_busbars: Vec<WayRef>,
    /// Ways whose `cables` tag could not be read; they are kept unmodified.
    pub cable_issues: Vec<(WayRef, RecordIssue)>,
}

/// Removes intra-substation connectors and annotates the remaining ways
/// with DC heuristics and their number of circuits.
pub fn filter(ways: Vec<Way>, busbar_max_length: f64) -> Filtered {
    let mut filtered = Filtered::default();
    for mut way in ways {
        if matches!(way.tag("line"), Some("busbar" | "bay")) {
            if way.straight_length < busbar_max_length {
                filtered.busbars.push(way);
                continue;
            }
            warn!(
                way = way.id,
                length = way.straight_length,
                limit = busbar_max_length,
                "busbar/bay exceeds the length limit, keeping it"
            );
            filtered.oversized_busbars.push(way.reference());
        }

        way.dc_reasons = dc_reasons(&way.tags);
        if way.is_dc_candidate() {
            debug!(way = way.id, reasons = ?way.dc_reasons, "flagged as DC candidate");
        }

        match system_count(&way.tags) {
            Ok(count) => way.system_count = count,
            Err(issue) => {
                warn!(way = way.id, %issue, "leaving system count unset");
                filtered.cable_issues.push((way.reference(), issue));
            }
        }
        filtered.ways.push(way);
    }

    info!(
        kept = filtered.ways.len(),
        busbars = filtered.busbars.len(),
        dc_candidates = filtered.ways.iter().filter(|w| w.is_dc_candidate()).count(),
        "filtered topology"
    );
    filtered
}

fn dc_name() -> &'static Regex {
    static DC_NAME: OnceLock<Regex> = OnceLock::new();
    DC_NAME.get_or_init(|| Regex::new(r"(?i)dc").expect("DC name pattern is valid"))
}

/// Every heuristic that marks a way as a possible DC line.
pub fn dc_reasons(tags: &Tags) -> Vec<DcReason> {
    let mut reasons = Vec::new();
    if parse_tag::<f64>(tags, "frequency") == Some(0.) {
        reasons.push(DcReason::ZeroFrequency);
    }
    if tags.get("name").is_some_and(|name| dc_name().is_match(name)) {
        reasons.push(DcReason::NameContainsDc);
    }
    if parse_tag::<u32>(tags, "cables") == Some(1) {
        reasons.push(DcReason::SingleCable);
    }
    reasons
}

/// Number of parallel systems implied by the `cables` tag.
///
/// Three cables form one three-phase system, so only 6, 9 and 12 cables
/// map to multiple systems.
pub fn system_count(tags: &Tags) -> Result<Option<u8>, RecordIssue> {
    let Some(raw) = tags.get("cables") else {
        return Ok(None);
    };
    let Ok(cables) = raw.trim().parse::<u32>() else {
        if raw.contains(';') {
            return Err(RecordIssue::AmbiguousMultiValue {
                key: "cables".to_string(),
                value: raw.clone(),
            });
        }
        return Err(RecordIssue::parse("cables", raw));
    };
    Ok(match cables {
        6 => Some(2),
        9 => Some(3),
        12 => Some(4),
        _ => None,
    })
}

fn parse_tag<T: std::str::FromStr>(tags: &Tags, key: &str) -> Option<T> {
    tags.get(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Endpoint, Position};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn way(id: i64, length: f64, pairs: &[(&str, &str)]) -> Way {
        let origin = Position { lon: 0., lat: 0., x: 0., y: 0. };
        let end = Position { lon: 0., lat: 0.01, x: 0., y: length };
        Way {
            id,
            uid: id as u64,
            nodes: vec![1, 2],
            tags: tags(pairs),
            voltage: 380000.,
            voltage_levels: 1,
            endpoints: [Endpoint::new(1, origin), Endpoint::new(2, end)],
            straight_length: length,
            real_length: None,
            dc_reasons: Vec::new(),
            system_count: None,
        }
    }

    #[test]
    fn removes_short_busbars() {
        let filtered = filter(
            vec![
                way(1, 0.3, &[("line", "busbar")]),
                way(2, 0.3, &[("line", "bay")]),
                way(3, 0.3, &[]),
            ],
            1.0,
        );
        assert_eq!(filtered.ways.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(filtered.busbars.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn keeps_long_busbars() {
        let filtered = filter(vec![way(1, 2.5, &[("line", "busbar")])], 1.0);
        assert_eq!(filtered.ways.len(), 1);
        assert!(filtered.busbars.is_empty());
        assert_eq!(filtered.oversized_busbars, vec![WayRef { id: 1, uid: 1 }]);
    }

    #[test]
    fn records_every_dc_reason() {
        let reasons = dc_reasons(&tags(&[("frequency", "0"), ("name", "HVDC Link"), ("cables", "1")]));
        assert_eq!(
            reasons,
            vec![DcReason::ZeroFrequency, DcReason::NameContainsDc, DcReason::SingleCable]
        );
        assert!(dc_reasons(&tags(&[("frequency", "50"), ("name", "Nord"), ("cables", "3")])).is_empty());
    }

    #[test]
    fn maps_cables_to_systems() {
        assert_eq!(system_count(&tags(&[("cables", "6")])), Ok(Some(2)));
        assert_eq!(system_count(&tags(&[("cables", "9")])), Ok(Some(3)));
        assert_eq!(system_count(&tags(&[("cables", "12")])), Ok(Some(4)));
        assert_eq!(system_count(&tags(&[("cables", "3")])), Ok(None));
        assert_eq!(system_count(&Tags::new()), Ok(None));
        assert!(matches!(
            system_count(&tags(&[("cables", "3;6")])),
            Err(RecordIssue::AmbiguousMultiValue { .. })
        ));
    }

    #[test]
    fn ambiguous_cables_keep_the_way() {
        let filtered = filter(vec![way(1, 5., &[("cables", "3;6")]), way(2, 5., &[("cables", "9")])], 1.0);
        assert_eq!(filtered.ways.len(), 2);
        assert_eq!(filtered.ways[0].system_count, None);
        assert_eq!(filtered.ways[1].system_count, Some(3));
        assert_eq!(filtered.cable_issues.len(), 1);
    }
}
