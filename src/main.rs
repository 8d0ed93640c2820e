use anyhow::Context;
use clap::Parser;
use grid_topology::{
    util::{read_dataset, write_diagnostics, write_tables},
    Config, DistanceStrategy, Pipeline,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with `nodes` and `ways` records.
    input: PathBuf,

    /// Directory receiving lines.csv and nodes.csv.
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// JSON configuration file; flags below override its values.
    #[arg(short, long, env = "GRID_TOPOLOGY_CONFIG")]
    config: Option<PathBuf>,

    /// Two-letter prefix of exported identifiers.
    #[arg(long, env = "GRID_COUNTRY_CODE")]
    country_code: Option<String>,

    /// Endpoint clustering radius in km.
    #[arg(long)]
    neighbourhood_threshold: Option<f64>,

    /// Busbars and bays shorter than this (km) are removed.
    #[arg(long)]
    busbar_max_length: Option<f64>,

    /// Factor applied to exported line lengths.
    #[arg(long)]
    length_slack: Option<f64>,

    /// Walk the original polylines to compute real lengths.
    #[arg(long)]
    real_length: bool,

    /// How endpoint pairs are found.
    #[arg(long, value_enum)]
    distance_strategy: Option<DistanceStrategy>,

    /// Write per-record diagnostics as JSON to this path.
    #[arg(long)]
    diagnostics: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(code) = &self.country_code {
            config.country_code = code.clone();
        }
        if let Some(threshold) = self.neighbourhood_threshold {
            config.neighbourhood_threshold = threshold;
        }
        if let Some(length) = self.busbar_max_length {
            config.busbar_max_length = length;
        }
        if let Some(slack) = self.length_slack {
            config.length_slack_multiplier = slack;
        }
        if self.real_length {
            config.compute_real_length = true;
        }
        if let Some(strategy) = self.distance_strategy {
            config.distance_strategy = strategy;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let pipeline = Pipeline::new(args.config()?)?;
    let dataset = read_dataset(&args.input)?;

    let start = Instant::now();
    let output = pipeline.run(&dataset);
    tracing::info!("Topology built in {:?}", start.elapsed());

    write_tables(&output.export, &args.out_dir)
        .with_context(|| format!("writing tables to {:?}", args.out_dir))?;
    if let Some(path) = &args.diagnostics {
        write_diagnostics(&output.diagnostics, path)
            .with_context(|| format!("writing diagnostics to {path:?}"))?;
    }
    println!("{}", output.diagnostics.summary());
    Ok(())
}
