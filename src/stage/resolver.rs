use crate::{
    error::RecordIssue,
    model::{Slot, Way},
};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub ways: Vec<Way>,
    /// Ways whose endpoints collapsed onto one point.
    pub singular: Vec<(Way, RecordIssue)>,
}

/// Fixes the final coordinate of every endpoint: the grouped coordinate when
/// clustering assigned one, the raw coordinate otherwise.
pub fn resolve(ways: Vec<Way>) -> Resolved {
    let mut resolved = Resolved::default();
    for mut way in ways {
        for slot in Slot::BOTH {
            let endpoint = way.endpoint_mut(slot);
            endpoint.resolved = Some(endpoint.grouped.unwrap_or(endpoint.raw));
        }
        let first = way.endpoint(Slot::First).position();
        if first.key() == way.endpoint(Slot::Second).position().key() {
            let issue = RecordIssue::GeometricDegeneracy {
                lon: first.lon,
                lat: first.lat,
            };
            warn!(way = way.id, uid = way.uid, %issue, "way collapsed to a single point");
            resolved.singular.push((way, issue));
        } else {
            resolved.ways.push(way);
        }
    }
    info!(
        ways = resolved.ways.len(),
        singular = resolved.singular.len(),
        "resolved endpoint coordinates"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Endpoint, Position};

    fn position(lon: f64, lat: f64) -> Position {
        Position { lon, lat, x: lon * 100., y: lat * 100. }
    }

    fn way(id: i64, from: Position, to: Position) -> Way {
        Way {
            id,
            uid: id as u64,
            nodes: vec![1, 2],
            tags: Default::default(),
            voltage: 110000.,
            voltage_levels: 1,
            endpoints: [Endpoint::new(1, from), Endpoint::new(2, to)],
            straight_length: 1.,
            real_length: None,
            dc_reasons: Vec::new(),
            system_count: None,
        }
    }

    #[test]
    fn prefers_grouped_coordinates() {
        let mut grouped = way(1, position(0., 0.), position(1., 1.));
        grouped.endpoint_mut(Slot::Second).grouped = Some(position(1.5, 1.5));
        let resolved = resolve(vec![grouped]);
        let way = &resolved.ways[0];
        assert_eq!(way.endpoint(Slot::First).resolved, Some(position(0., 0.)));
        assert_eq!(way.endpoint(Slot::Second).resolved, Some(position(1.5, 1.5)));
    }

    #[test]
    fn removes_collapsed_ways() {
        let mut collapsed = way(1, position(0., 0.), position(0.001, 0.));
        collapsed.endpoint_mut(Slot::First).grouped = Some(position(0.0005, 0.));
        collapsed.endpoint_mut(Slot::Second).grouped = Some(position(0.0005, 0.));
        let resolved = resolve(vec![collapsed, way(2, position(0., 0.), position(1., 0.))]);
        assert_eq!(resolved.ways.len(), 1);
        assert_eq!(resolved.ways[0].id, 2);
        assert_eq!(resolved.singular.len(), 1);
        assert!(matches!(resolved.singular[0].1, RecordIssue::GeometricDegeneracy { .. }));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut grouped = way(1, position(0., 0.), position(1., 1.));
        grouped.endpoint_mut(Slot::First).grouped = Some(position(0.1, 0.1));
        let once = resolve(vec![grouped, way(2, position(3., 3.), position(4., 4.))]);
        let twice = resolve(once.ways.clone());
        assert_eq!(once.ways, twice.ways);
    }
}
