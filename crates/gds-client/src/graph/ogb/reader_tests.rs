//! Tests for the OGB directory reader.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use super::read_node_dataset;
use crate::error::Error;

fn write_gz(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn tiny_dataset(root: &Path) {
    write_gz(&root.join("raw/edge.csv.gz"), "0,1\n1,2\n2,0\n");
    write_gz(&root.join("raw/num-node-list.csv.gz"), "3\n");
    write_gz(&root.join("raw/node-label.csv.gz"), "5\n6\n7\n");
    write_gz(
        &root.join("raw/node-feat.csv.gz"),
        "0.5,1.0\n-1.5,2.0\n3.25,0.0\n",
    );
    write_gz(&root.join("split/time/train.csv.gz"), "0\n");
    write_gz(&root.join("split/time/valid.csv.gz"), "1\n");
    write_gz(&root.join("split/time/test.csv.gz"), "2\n");
}

#[test]
fn test_reads_homogeneous_layout() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("ogbn_tiny");
    tiny_dataset(&root);

    let dataset = read_node_dataset(&root).unwrap();

    assert_eq!(dataset.name, "ogbn-tiny");
    assert_eq!(dataset.graph.num_nodes, 3);
    assert_eq!(dataset.graph.edge_index, vec![(0, 1), (1, 2), (2, 0)]);
    assert_eq!(dataset.labels, vec![5, 6, 7]);
    assert_eq!(
        dataset.graph.node_feat.as_deref(),
        Some(&[vec![0.5, 1.0], vec![-1.5, 2.0], vec![3.25, 0.0]][..])
    );
    assert!(dataset.graph.edge_feat.is_none());
    assert_eq!(dataset.split.valid, vec![1]);
    assert_eq!(dataset.split.test, vec![2]);
}

#[test]
fn test_missing_split_is_dataset_error() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("ogbn_tiny");
    tiny_dataset(&root);
    fs::remove_dir_all(root.join("split/time")).unwrap();

    assert!(matches!(read_node_dataset(&root), Err(Error::Dataset(_))));
}

#[test]
fn test_malformed_edge_line() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("ogbn_tiny");
    tiny_dataset(&root);
    write_gz(&root.join("raw/edge.csv.gz"), "0,1\n1,2,3\n");

    match read_node_dataset(&root) {
        Err(Error::Dataset(message)) => assert!(message.contains("line 2")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_unparsable_label() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("ogbn_tiny");
    tiny_dataset(&root);
    write_gz(&root.join("raw/node-label.csv.gz"), "5\nnan\n7\n");

    assert!(matches!(read_node_dataset(&root), Err(Error::Dataset(_))));
}
