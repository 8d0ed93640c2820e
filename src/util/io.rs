use crate::{
    model::{Dataset, Node, RawWay},
    report::Diagnostics,
    stage::{Export, LineRecord, NodeRecord},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Deserialize)]
struct RawInput {
    #[serde(default)]
    nodes: Vec<serde_json::Value>,
    #[serde(default)]
    ways: Vec<serde_json::Value>,
}

pub fn read_dataset(path: &Path) -> anyhow::Result<Dataset> {
    if !path.exists() {
        return Err(anyhow::anyhow!("The provided path {:?} does not exist", path));
    }
    let dataset = parse_dataset(BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        ways = dataset.ways().len(),
        dropped = dataset.dropped(),
        "read dataset"
    );
    Ok(dataset)
}

/// Reads `{"nodes": [...], "ways": [...]}`. Records that do not have the
/// expected shape are dropped one by one instead of failing the whole input.
pub fn parse_dataset(reader: impl Read) -> anyhow::Result<Dataset> {
    let input: RawInput = serde_json::from_reader(reader)?;
    let (nodes, bad_nodes) = decode_records::<Node>(input.nodes, "node");
    let (ways, bad_ways) = decode_records::<RawWay>(input.ways, "way");
    Ok(Dataset::new(nodes, ways).with_decode_failures(bad_nodes + bad_ways))
}

fn decode_records<T: DeserializeOwned>(values: Vec<serde_json::Value>, kind: &str) -> (Vec<T>, usize) {
    let mut failures = 0;
    let records = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(kind, index, %error, "dropping malformed record");
                failures += 1;
                None
            }
        })
        .collect();
    (records, failures)
}

pub fn write_lines<W: Write>(writer: W, lines: &[LineRecord]) -> anyhow::Result<()> {
    write_records(writer, lines)
}

pub fn write_nodes<W: Write>(writer: W, nodes: &[NodeRecord]) -> anyhow::Result<()> {
    write_records(writer, nodes)
}

fn write_records<W: Write, R: Serialize>(writer: W, records: &[R]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `lines.csv` and `nodes.csv` into `out_dir`, creating it if needed.
pub fn write_tables(export: &Export, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let lines_path = out_dir.join("lines.csv");
    let nodes_path = out_dir.join("nodes.csv");
    write_lines(BufWriter::new(File::create(&lines_path)?), &export.lines)?;
    write_nodes(BufWriter::new(File::create(&nodes_path)?), &export.nodes)?;
    info!(
        lines = %lines_path.display(),
        nodes = %nodes_path.display(),
        "wrote tables"
    );
    Ok(())
}

pub fn write_diagnostics(diagnostics: &Diagnostics, path: &Path) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, diagnostics)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, pipeline::Pipeline};

    const INPUT: &str = r#"{
        "nodes": [
            {"id": 1, "lon": 10.0, "lat": 50.0},
            {"id": 2, "lon": 10.1, "lat": 50.0},
            {"id": 3, "lon": "east", "lat": 50.0},
            {"id": 4, "lon": 10.1, "lat": 50.2}
        ],
        "ways": [
            {"id": 10, "nodes": [1, 2], "tags": {"voltage": "380000", "cables": "6"}},
            {"id": 11, "nodes": [2, 4], "tags": {"voltage": "220000", "name": "DC link"}},
            {"id": 12, "tags": {"voltage": "220000"}},
            {"id": 13, "nodes": [2, 3], "tags": {"voltage": "220000"}}
        ]
    }"#;

    #[test]
    fn drops_malformed_records() {
        let dataset = parse_dataset(INPUT.as_bytes()).unwrap();
        assert_eq!(dataset.ways().len(), 2);
        // node 3, way 12 fail to decode; way 13 references the dropped node
        assert_eq!(dataset.dropped(), 3);
    }

    #[test]
    fn rejects_non_object_input() {
        assert!(parse_dataset("[1, 2]".as_bytes()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_dataset(Path::new("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn writes_tables_with_export_columns() {
        let dataset = parse_dataset(INPUT.as_bytes()).unwrap();
        let output = Pipeline::new(Config::default()).unwrap().run(&dataset);
        let dir = tempfile::tempdir().unwrap();
        write_tables(&output.export, dir.path()).unwrap();

        let lines = std::fs::read_to_string(dir.path().join("lines.csv")).unwrap();
        let mut rows = lines.lines();
        assert_eq!(
            rows.next(),
            Some("LineID,Country,FromNode,ToNode,VoltageKV,R,XL,XC,Itherm,LengthKM,Capacity,Note,PhiPsMax")
        );
        assert_eq!(rows.count(), 3);

        let nodes = std::fs::read_to_string(dir.path().join("nodes.csv")).unwrap();
        assert_eq!(
            nodes.lines().next(),
            Some("NodeID,Country,VoltageKV,Latitude,Longitude")
        );
        assert_eq!(nodes.lines().count(), 1 + 4);
    }

    #[test]
    fn writes_diagnostics_json() {
        let dataset = parse_dataset(INPUT.as_bytes()).unwrap();
        let output = Pipeline::new(Config::default()).unwrap().run(&dataset);
        let file = tempfile::NamedTempFile::new().unwrap();
        write_diagnostics(&output.diagnostics, file.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(value["dropped_records"], 3);
        assert_eq!(value["dc_candidates"][0]["reasons"][0], "name_contains_dc");
    }
}
