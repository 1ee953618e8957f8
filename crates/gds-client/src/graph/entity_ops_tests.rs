//! Tests for the property and label sub-namespaces.

use std::sync::Arc;

use serde_json::json;

use super::entity_ops::reshape_property_stream;
use super::{Graph, GraphProcRunner};
use crate::call::Strings;
use crate::frame::DataFrame;
use crate::namespace::EndpointContext;
use crate::query_runner::CollectingQueryRunner;
use crate::server_version::ServerVersion;

fn setup() -> (CollectingQueryRunner, GraphProcRunner, Graph) {
    let runner = CollectingQueryRunner::new(ServerVersion::new(2, 5, 0));
    let shared = Arc::new(runner.clone());
    let gds = GraphProcRunner::new(EndpointContext::new(shared.clone(), "gds.graph"));
    (runner, gds, Graph::new("g", shared))
}

fn ok_row() -> DataFrame {
    DataFrame::from_columns(vec![("ok", vec![json!(true)])]).unwrap()
}

#[tokio::test]
async fn test_node_properties_sub_namespace() {
    let (runner, gds, g) = setup();
    runner.add_result("CALL gds.graph.nodeProperties", ok_row());

    gds.node_properties()
        .write(&g, &["pr"], Strings::all(), json!({}))
        .await
        .unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.nodeProperties.write($graph_name, $properties, $entities, $config)")
    );

    gds.node_properties()
        .drop(&g, &["pr", "rank"], json!({"failIfMissing": true}))
        .await
        .unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.nodeProperties.drop($graph_name, $node_properties, $config)")
    );
    assert_eq!(
        runner.last_params().unwrap().to_json()["node_properties"],
        json!(["pr", "rank"])
    );
}

#[tokio::test]
async fn test_single_property_stream() {
    let (runner, gds, g) = setup();

    gds.node_property()
        .stream(&g, "pr", ["Person"], json!({}))
        .await
        .unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.nodeProperty.stream($graph_name, $properties, $entities, $config)")
    );
    assert_eq!(runner.last_params().unwrap().to_json()["properties"], json!("pr"));

    gds.relationship_property()
        .stream(&g, "weight", Strings::all(), json!({}))
        .await
        .unwrap();
    assert!(runner
        .last_query()
        .unwrap()
        .starts_with("CALL gds.graph.relationshipProperty.stream("));
}

#[tokio::test]
async fn test_relationships_to_undirected_merges_config() {
    let (runner, gds, g) = setup();
    runner.add_result("CALL gds.graph.relationships.toUndirected", ok_row());

    gds.relationships()
        .to_undirected(&g, "R", "R_UNDIRECTED", json!({"aggregation": "SINGLE"}))
        .await
        .unwrap();

    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.relationships.toUndirected($graph_name, $config)")
    );
    assert_eq!(
        runner.last_params().unwrap().to_json()["config"],
        json!({
            "aggregation": "SINGLE",
            "relationshipType": "R",
            "mutateRelationshipType": "R_UNDIRECTED"
        })
    );
}

#[tokio::test]
async fn test_relationship_properties_write() {
    let (runner, gds, g) = setup();
    runner.add_result("CALL gds.graph.relationshipProperties.write", ok_row());

    gds.relationship_properties()
        .write(&g, "R", &["w1", "w2"], json!(null))
        .await
        .unwrap();

    assert_eq!(
        runner.last_query().as_deref(),
        Some(
            "CALL gds.graph.relationshipProperties.write($graph_name, $relationship_type, \
             $relationship_properties, $config)"
        )
    );
}

#[tokio::test]
async fn test_graph_property_and_node_label() {
    let (runner, gds, g) = setup();
    runner.add_result("CALL gds.graph.nodeLabel.mutate", ok_row());

    gds.graph_property()
        .unwrap()
        .stream(&g, "componentCount", json!({}))
        .await
        .unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.graphProperty.stream($graph_name, $graph_property, $config)")
    );

    gds.node_label()
        .unwrap()
        .mutate(&g, "Big", json!({"nodeFilter": "n.size > 10"}))
        .await
        .unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.nodeLabel.mutate($graph_name, $node_label, $config)")
    );
}

#[test]
fn test_reshape_leaves_frames_without_key_columns() {
    let frame = DataFrame::from_columns(vec![("x", vec![json!(1)])]).unwrap();
    let out = reshape_property_stream(frame.clone(), &["nodeId"], "nodeProperty", false).unwrap();
    assert_eq!(out, frame);
}

#[test]
fn test_reshape_pivot_fills_missing_with_null() {
    let long = DataFrame::from_columns(vec![
        ("nodeId", vec![json!(0), json!(1)]),
        ("nodeProperty", vec![json!("a"), json!("b")]),
        ("propertyValue", vec![json!(1.5), json!([1, 2])]),
    ])
    .unwrap();

    let wide = reshape_property_stream(long, &["nodeId"], "nodeProperty", true).unwrap();
    assert_eq!(wide.row(0).unwrap()["b"], json!(null));
    assert_eq!(wide.row(1).unwrap()["b"], json!([1, 2]));
}
