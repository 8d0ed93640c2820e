mod node;
mod way;

pub use node::{Dataset, Node, RawWay, SourceWay, Tags};
pub use way::{CoordKey, DcReason, Endpoint, Position, Slot, Way, WayRef};
