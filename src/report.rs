use crate::{
    error::RecordIssue,
    model::{DcReason, WayRef},
    stage::LengthDeviation,
};
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueEntry {
    pub way: WayRef,
    pub issue: RecordIssue,
}

impl From<(WayRef, RecordIssue)> for IssueEntry {
    fn from((way, issue): (WayRef, RecordIssue)) -> Self {
        IssueEntry { way, issue }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcCandidate {
    pub way: WayRef,
    pub reasons: Vec<DcReason>,
}

/// Everything a run excluded, flagged or measured, per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub dropped_records: usize,
    pub excluded: Vec<IssueEntry>,
    pub cable_issues: Vec<IssueEntry>,
    pub busbars: Vec<WayRef>,
    pub oversized_busbars: Vec<WayRef>,
    pub dc_candidates: Vec<DcCandidate>,
    pub stacked_clusters: usize,
    pub neighbourhood_clusters: usize,
    pub singular: Vec<IssueEntry>,
    pub length_deviations: Vec<LengthDeviation>,
    pub line_count: usize,
    pub node_count: usize,
}

impl Diagnostics {
    /// Mean relative deviation of real from beeline length, in percent.
    pub fn mean_length_deviation(&self) -> Option<f64> {
        let percents: Vec<f64> = self
            .length_deviations
            .iter()
            .filter_map(|deviation| deviation.percent)
            .collect();
        (!percents.is_empty()).then(|| percents.iter().sum::<f64>() / percents.len() as f64)
    }

    /// Operator-facing summary, one row per diagnostic.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        let mut row = |label: &str, count: usize, bad: bool| {
            let value = if count == 0 {
                "none".green()
            } else if bad {
                count.to_string().yellow()
            } else {
                count.to_string().normal()
            };
            summary.push_str(&format!("{0: <25}{1: >25}\n", label, value));
        };
        row("Dropped records", self.dropped_records, true);
        row("Excluded ways", self.excluded.len(), true);
        row("Unreadable cable tags", self.cable_issues.len(), true);
        row("Busbars removed", self.busbars.len(), false);
        row("Oversized busbars kept", self.oversized_busbars.len(), true);
        row("DC candidates", self.dc_candidates.len(), true);
        row("Stacked clusters", self.stacked_clusters, false);
        row("Neighbourhood clusters", self.neighbourhood_clusters, false);
        row("Singular ways", self.singular.len(), true);
        row("Exported lines", self.line_count, false);
        row("Exported nodes", self.node_count, false);
        if let Some(mean) = self.mean_length_deviation() {
            summary.push_str(&format!(
                "{0: <25}{1: >25}\n",
                "Mean length deviation",
                format!("{mean:.2} %")
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deviation(percent: Option<f64>) -> LengthDeviation {
        LengthDeviation {
            uid: 1,
            way_id: 1,
            straight_km: 1.,
            real_km: 1.,
            absolute_km: 0.,
            percent,
        }
    }

    #[test]
    fn mean_deviation_skips_zero_beelines() {
        let diagnostics = Diagnostics {
            length_deviations: vec![deviation(Some(10.)), deviation(None), deviation(Some(20.))],
            ..Default::default()
        };
        assert_eq!(diagnostics.mean_length_deviation(), Some(15.));
        assert_eq!(Diagnostics::default().mean_length_deviation(), None);
    }

    #[test]
    fn summary_lists_every_row() {
        colored::control::set_override(false);
        let diagnostics = Diagnostics {
            line_count: 4,
            ..Default::default()
        };
        let summary = diagnostics.summary();
        assert_eq!(summary.lines().count(), 11);
        assert!(summary.contains("Exported lines"));
        assert!(summary.lines().any(|line| line.starts_with("Exported lines") && line.ends_with('4')));
    }
}
