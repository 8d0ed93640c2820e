use crate::{
    config::{Config, DistanceStrategy},
    error::{ConfigError, RecordIssue},
    model::{Dataset, Way},
    report::{DcCandidate, Diagnostics, IssueEntry},
    stage::{
        self, Clustering, DistanceMatrix, EndpointIndex, Enriched, Export, Filtered, LengthReport,
        Projection, Resolved,
    },
};
use std::time::Instant;
use tracing::{info, warn};

/// Everything a run produces.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub export: Export,
    pub diagnostics: Diagnostics,
    pub projection: Option<Projection>,
    pub clustering: Clustering,
    /// Busbars and bays removed from the topology.
    pub busbars: Vec<Way>,
    /// Ways that collapsed onto a single point.
    pub singular: Vec<(Way, RecordIssue)>,
}

/// Runs the topology stages in order. Each stage is also callable on its own.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fits the projection on the endpoints of every ingested way.
    pub fn project(&self, dataset: &Dataset) -> Option<Projection> {
        Projection::fit(dataset.endpoint_points())
    }

    pub fn enrich(&self, dataset: &Dataset, projection: &Projection) -> Enriched {
        stage::enrich(dataset, projection)
    }

    pub fn filter(&self, ways: Vec<Way>) -> Filtered {
        stage::filter(ways, self.config.busbar_max_length)
    }

    /// Finds both cluster families and writes the grouped coordinates.
    pub fn cluster(&self, ways: Vec<Way>, projection: &Projection) -> (Vec<Way>, Clustering) {
        let threshold = self.config.neighbourhood_threshold;
        let clustering = match self.config.distance_strategy {
            DistanceStrategy::Matrix => stage::find_clusters(&DistanceMatrix::from_ways(&ways), threshold),
            DistanceStrategy::Rtree => stage::find_clusters(&EndpointIndex::from_ways(&ways), threshold),
        };
        let ways = stage::apply_clusters(ways, &clustering, projection);
        (ways, clustering)
    }

    pub fn resolve(&self, ways: Vec<Way>) -> Resolved {
        stage::resolve(ways)
    }

    pub fn real_lengths(&self, ways: Vec<Way>, dataset: &Dataset) -> LengthReport {
        stage::real_lengths(ways, dataset)
    }

    pub fn assign_identities(&self, ways: &[Way]) -> Export {
        stage::assign_identities(ways, &self.config)
    }

    pub fn run(&self, dataset: &Dataset) -> PipelineOutput {
        let start = Instant::now();
        let mut diagnostics = Diagnostics {
            dropped_records: dataset.dropped(),
            ..Default::default()
        };
        let Some(projection) = self.project(dataset) else {
            warn!("dataset holds no ways, nothing to do");
            return PipelineOutput {
                diagnostics,
                ..Default::default()
            };
        };
        info!(
            origin_lon = projection.origin_lon,
            origin_lat = projection.origin_lat,
            km_per_lon_deg = projection.km_per_lon_deg,
            km_per_lat_deg = projection.km_per_lat_deg,
            "fitted projection"
        );

        let enriched = self.enrich(dataset, &projection);
        diagnostics.excluded = enriched.excluded.into_iter().map(IssueEntry::from).collect();

        let filtered = self.filter(enriched.ways);
        diagnostics.busbars = filtered.busbars.iter().map(Way::reference).collect();
        diagnostics.oversized_busbars = filtered.oversized_busbars;
        diagnostics.cable_issues = filtered.cable_issues.into_iter().map(IssueEntry::from).collect();
        diagnostics.dc_candidates = filtered
            .ways
            .iter()
            .filter(|way| way.is_dc_candidate())
            .map(|way| DcCandidate {
                way: way.reference(),
                reasons: way.dc_reasons.clone(),
            })
            .collect();

        let (ways, clustering) = self.cluster(filtered.ways, &projection);
        diagnostics.stacked_clusters = clustering.stacked.len();
        diagnostics.neighbourhood_clusters = clustering.neighbourhood.len();

        let resolved = self.resolve(ways);
        diagnostics.singular = resolved
            .singular
            .iter()
            .map(|(way, issue)| IssueEntry {
                way: way.reference(),
                issue: issue.clone(),
            })
            .collect();

        let ways = if self.config.compute_real_length {
            let report = self.real_lengths(resolved.ways, dataset);
            diagnostics.length_deviations = report.deviations;
            report.ways
        } else {
            resolved.ways
        };

        let export = self.assign_identities(&ways);
        diagnostics.line_count = export.lines.len();
        diagnostics.node_count = export.nodes.len();
        info!(elapsed = ?start.elapsed(), "pipeline finished");

        PipelineOutput {
            export,
            diagnostics,
            projection: Some(projection),
            clustering,
            busbars: filtered.busbars,
            singular: resolved.singular,
        }
    }
}
