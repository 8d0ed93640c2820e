use crate::{
    model::{Dataset, Way},
    util::polyline_length,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Real against beeline length of one source way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthDeviation {
    pub uid: u64,
    pub way_id: i64,
    pub straight_km: f64,
    pub real_km: f64,
    pub absolute_km: f64,
    /// Relative to the beeline length; `None` for a zero beeline.
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct LengthReport {
    pub ways: Vec<Way>,
    pub deviations: Vec<LengthDeviation>,
}

/// Walks the original member sequence of every source way once and
/// broadcasts its length to all clones sharing the same uid.
pub fn real_lengths(mut ways: Vec<Way>, dataset: &Dataset) -> LengthReport {
    let mut lengths: HashMap<u64, f64> = HashMap::new();
    let mut deviations = Vec::new();
    for way in &ways {
        if lengths.contains_key(&way.uid) {
            continue;
        }
        let Some(line) = dataset.polyline(way.uid) else {
            warn!(way = way.id, uid = way.uid, "no source polyline, keeping beeline length");
            continue;
        };
        let real_km = polyline_length(&line);
        lengths.insert(way.uid, real_km);
        let absolute_km = real_km - way.straight_length;
        deviations.push(LengthDeviation {
            uid: way.uid,
            way_id: way.id,
            straight_km: way.straight_length,
            real_km,
            absolute_km,
            percent: (way.straight_length > 0.).then(|| absolute_km / way.straight_length * 100.),
        });
    }
    for way in &mut ways {
        way.real_length = lengths.get(&way.uid).copied();
    }
    info!(sources = lengths.len(), ways = ways.len(), "computed real lengths");
    LengthReport { ways, deviations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Node, RawWay, Tags},
        stage::{enrich, Projection},
        util::EARTH_RADIUS_KM,
    };

    fn dataset() -> Dataset {
        let nodes = vec![
            Node { id: 1, lon: 0., lat: 0. },
            Node { id: 2, lon: 0., lat: 1. },
            Node { id: 3, lon: 0., lat: 2. },
            Node { id: 4, lon: 0.5, lat: 1. },
        ];
        let tags: Tags = [("voltage".to_string(), "220000;380000".to_string())].into();
        let ways = vec![
            RawWay { id: 7, nodes: vec![1, 4, 3], tags: tags.clone() },
            RawWay { id: 8, nodes: vec![1, 2], tags },
        ];
        Dataset::new(nodes, ways)
    }

    #[test]
    fn broadcasts_to_clones() {
        let dataset = dataset();
        let projection = Projection::fit(dataset.endpoint_points()).unwrap();
        let ways = enrich(&dataset, &projection).ways;
        assert_eq!(ways.len(), 4);
        let report = real_lengths(ways, &dataset);
        assert_eq!(report.deviations.len(), 2);
        assert_eq!(report.ways[0].real_length, report.ways[1].real_length);
        let degree = EARTH_RADIUS_KM * 1f64.to_radians();
        let short = report.ways[2].real_length.unwrap();
        assert!((short - degree).abs() < 1e-9);
        assert!(report.ways[0].real_length.unwrap() > 2. * degree);
    }

    #[test]
    fn reports_detour_against_beeline() {
        let dataset = dataset();
        let projection = Projection::fit(dataset.endpoint_points()).unwrap();
        let report = real_lengths(enrich(&dataset, &projection).ways, &dataset);
        let detour = report.deviations.iter().find(|d| d.way_id == 7).unwrap();
        assert!(detour.absolute_km > 0.);
        assert!(detour.percent.unwrap() > 0.);
        assert_eq!(detour.absolute_km, detour.real_km - detour.straight_km);
    }
}
