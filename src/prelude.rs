pub use crate::config::{Config, DistanceStrategy};
pub use crate::model::{Dataset, Node, RawWay, Slot, Way};
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::report::Diagnostics;
pub use crate::stage::{Export, LineRecord, NodeRecord, PairSource};
pub use crate::util::{read_dataset, write_diagnostics, write_tables};
