//! Reader for the OGB on-disk layout of homogeneous node datasets.
//!
//! ```text
//! <root>/raw/edge.csv.gz            source,target per line
//! <root>/raw/num-node-list.csv.gz   node count
//! <root>/raw/node-label.csv.gz      class label per node
//! <root>/raw/node-feat.csv.gz       optional, features per node
//! <root>/raw/edge-feat.csv.gz       optional, features per edge
//! <root>/split/<scheme>/{train,valid,test}.csv.gz
//! ```

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use super::{Edge, Features, HomogeneousGraph, HomogeneousNodeDataset, NodeSplit};
use crate::error::{Error, Result};

/// Reads a homogeneous node property prediction dataset from `root`.
///
/// The dataset name is derived from the directory name, so
/// `dataset/ogbn_arxiv` yields `ogbn-arxiv`.
pub fn read_node_dataset(root: impl AsRef<Path>) -> Result<HomogeneousNodeDataset> {
    let root = root.as_ref();
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.replace('_', "-"))
        .ok_or_else(|| Error::Dataset(format!("{} is not a dataset directory", root.display())))?;
    info!("Reading OGB dataset {} from {}", name, root.display());

    let raw = root.join("raw");
    let edges: Vec<Vec<i64>> = read_table(&raw.join("edge.csv.gz"))?;
    let edge_index = edges
        .into_iter()
        .enumerate()
        .map(|(line, row)| match row[..] {
            [s, t] => Ok((s, t)),
            _ => Err(Error::Dataset(format!(
                "edge.csv.gz line {}: expected 2 values, got {}",
                line + 1,
                row.len()
            ))),
        })
        .collect::<Result<Vec<Edge>>>()?;

    let num_nodes = read_column::<usize>(&raw.join("num-node-list.csv.gz"))?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Dataset("num-node-list.csv.gz is empty".to_string()))?;

    let labels = read_column::<i64>(&raw.join("node-label.csv.gz"))?;
    let node_feat = read_optional::<Features>(&raw.join("node-feat.csv.gz"), read_table)?;
    let edge_feat = read_optional::<Features>(&raw.join("edge-feat.csv.gz"), read_table)?;

    let split_dir = split_scheme_dir(&root.join("split"))?;
    debug!("Using split {}", split_dir.display());
    let split = NodeSplit {
        train: read_column(&split_dir.join("train.csv.gz"))?,
        valid: read_column(&split_dir.join("valid.csv.gz"))?,
        test: read_column(&split_dir.join("test.csv.gz"))?,
    };

    Ok(HomogeneousNodeDataset {
        name,
        graph: HomogeneousGraph {
            edge_index,
            num_nodes,
            node_feat,
            edge_feat,
        },
        labels,
        split,
    })
}

fn gz_csv(path: &Path) -> Result<csv::Reader<GzDecoder<BufReader<File>>>> {
    let file = File::open(path).map_err(|e| {
        Error::Dataset(format!("cannot open {}: {e}", path.display()))
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(GzDecoder::new(BufReader::new(file))))
}

fn parse<T: FromStr>(path: &Path, line: usize, field: &str) -> Result<T> {
    field.trim().parse().map_err(|_| {
        Error::Dataset(format!(
            "{} line {line}: cannot parse '{field}'",
            path.display()
        ))
    })
}

fn read_table<T: FromStr>(path: &Path) -> Result<Vec<Vec<T>>> {
    let mut reader = gz_csv(path)?;
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| parse(path, idx + 1, field))
                .collect::<Result<Vec<T>>>()?,
        );
    }
    Ok(rows)
}

fn read_column<T: FromStr>(path: &Path) -> Result<Vec<T>> {
    let mut reader = gz_csv(path)?;
    let mut values = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let field = record.get(0).ok_or_else(|| {
            Error::Dataset(format!("{} line {}: empty line", path.display(), idx + 1))
        })?;
        values.push(parse(path, idx + 1, field)?);
    }
    Ok(values)
}

fn read_optional<T>(path: &Path, read: impl FnOnce(&Path) -> Result<T>) -> Result<Option<T>> {
    if path.exists() {
        read(path).map(Some)
    } else {
        Ok(None)
    }
}

/// The split scheme directory below `split/`, e.g. `split/time`.
fn split_scheme_dir(split: &Path) -> Result<PathBuf> {
    let mut schemes = fs::read_dir(split)
        .map_err(|e| Error::Dataset(format!("cannot read {}: {e}", split.display())))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    schemes.sort();

    match schemes.len() {
        0 => Err(Error::Dataset(format!(
            "{} contains no split scheme",
            split.display()
        ))),
        1 => Ok(schemes.remove(0)),
        _ => Err(Error::Dataset(format!(
            "{} contains several split schemes",
            split.display()
        ))),
    }
}
