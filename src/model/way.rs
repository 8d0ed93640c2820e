use super::Tags;
use geo_types::Point;
use serde::Serialize;
use std::fmt::Display;

/// A coordinate in both geographic degrees and local planar kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn geo(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    pub fn planar(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    /// Identity of the geographic coordinate, used to derive node identities.
    pub fn key(&self) -> CoordKey {
        CoordKey(self.lon.to_bits(), self.lat.to_bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(u64, u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::First, Slot::Second];

    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub node_id: i64,
    pub raw: Position,
    /// Set by endpoint clustering.
    pub grouped: Option<Position>,
    /// Set by coordinate resolution.
    pub resolved: Option<Position>,
}

impl Endpoint {
    pub fn new(node_id: i64, raw: Position) -> Self {
        Endpoint {
            node_id,
            raw,
            grouped: None,
            resolved: None,
        }
    }

    /// The resolved coordinate, or the raw one before resolution ran.
    pub fn position(&self) -> Position {
        self.resolved.unwrap_or(self.raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DcReason {
    ZeroFrequency,
    NameContainsDc,
    SingleCable,
}

impl Display for DcReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DcReason::ZeroFrequency => write!(f, "frequency=0"),
            DcReason::NameContainsDc => write!(f, "name contains dc"),
            DcReason::SingleCable => write!(f, "cables=1"),
        }
    }
}

/// Short reference to a way for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WayRef {
    pub id: i64,
    pub uid: u64,
}

/// One transmission-line segment candidate with a single resolved voltage.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: i64,
    /// Shared by every clone of the same source way.
    pub uid: u64,
    pub nodes: Vec<i64>,
    pub tags: Tags,
    /// Volts.
    pub voltage: f64,
    /// Number of voltage levels the source way carried.
    pub voltage_levels: usize,
    pub endpoints: [Endpoint; 2],
    pub straight_length: f64,
    pub real_length: Option<f64>,
    pub dc_reasons: Vec<DcReason>,
    pub system_count: Option<u8>,
}

impl Way {
    pub fn endpoint(&self, slot: Slot) -> &Endpoint {
        &self.endpoints[slot.index()]
    }

    pub fn endpoint_mut(&mut self, slot: Slot) -> &mut Endpoint {
        &mut self.endpoints[slot.index()]
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn reference(&self) -> WayRef {
        WayRef {
            id: self.id,
            uid: self.uid,
        }
    }

    pub fn is_dc_candidate(&self) -> bool {
        !self.dc_reasons.is_empty()
    }

    pub fn is_multi_voltage(&self) -> bool {
        self.voltage_levels > 1
    }

    /// Real length when it was computed, beeline length otherwise.
    pub fn length(&self) -> f64 {
        self.real_length.unwrap_or(self.straight_length)
    }

    /// Number of exported lines this way expands into.
    pub fn line_count(&self) -> usize {
        match self.system_count {
            Some(count @ 2..=4) => count as usize,
            _ => 1,
        }
    }
}
