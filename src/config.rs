use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How endpoint pairs are found before clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStrategy {
    /// Exact all-pairs distance matrix.
    #[default]
    Matrix,
    /// R-tree over the projected endpoints.
    Rtree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Two-letter prefix of every exported identifier.
    pub country_code: String,
    /// Clustering radius in km.
    pub neighbourhood_threshold: f64,
    /// Busbars and bays shorter than this (km) leave the topology.
    pub busbar_max_length: f64,
    pub length_slack_multiplier: f64,
    pub compute_real_length: bool,
    pub distance_strategy: DistanceStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            country_code: "XX".to_string(),
            neighbourhood_threshold: 0.5,
            busbar_max_length: 1.0,
            length_slack_multiplier: 1.0,
            compute_real_length: false,
            distance_strategy: DistanceStrategy::Matrix,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.country_code.len() != 2
            || !self.country_code.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::CountryCode(self.country_code.clone()));
        }
        for (name, value) in [
            ("neighbourhood threshold", self.neighbourhood_threshold),
            ("busbar max length", self.busbar_max_length),
        ] {
            if !value.is_finite() || value < 0. {
                return Err(ConfigError::Distance { name, value });
            }
        }
        if !(self.length_slack_multiplier >= 1.) || !self.length_slack_multiplier.is_finite() {
            return Err(ConfigError::Slack(self.length_slack_multiplier));
        }
        Ok(())
    }
}
