//! Builds a topologically consistent line/node graph of a power grid from
//! crowd-sourced transmission-line ways.
//!
//! The stages in [`stage`] run in order: projection, voltage enrichment,
//! busbar filtering, endpoint distances, endpoint clustering, coordinate
//! resolution, optional real lengths and identifier assignment.
//! [`pipeline::Pipeline`] chains them.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod stage;
pub mod util;

pub use config::{Config, DistanceStrategy};
pub use error::{ConfigError, RecordIssue};
pub use pipeline::{Pipeline, PipelineOutput};
