use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config file {path:?} is not valid: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("country code {0:?} must be exactly two ASCII letters")]
    CountryCode(String),
    #[error("{name} must be a finite, non-negative number of kilometres, got {value}")]
    Distance { name: &'static str, value: f64 },
    #[error("length slack multiplier must be at least 1, got {0}")]
    Slack(f64),
}

/// Per-record outcome that keeps a way out of (part of) the result.
///
/// None of these abort a run: the affected record is excluded or left
/// unmodified and the issue is surfaced through the diagnostics.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordIssue {
    #[error("tag `{key}` is missing")]
    MissingTag { key: String },
    #[error("tag `{key}` is not numeric: {value:?}")]
    ParseError { key: String, value: String },
    #[error("tag `voltage` lists {count} levels, at most 3 can be split")]
    UnsupportedVoltageCount { count: usize },
    #[error("tag `{key}` has an ambiguous multi-value {value:?}")]
    AmbiguousMultiValue { key: String, value: String },
    #[error("record is inconsistent: {detail}")]
    StructuralMismatch { detail: String },
    #[error("both endpoints resolve to ({lon}, {lat})")]
    GeometricDegeneracy { lon: f64, lat: f64 },
}

impl RecordIssue {
    pub fn missing(key: &str) -> Self {
        RecordIssue::MissingTag {
            key: key.to_string(),
        }
    }

    pub fn parse(key: &str, value: &str) -> Self {
        RecordIssue::ParseError {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
