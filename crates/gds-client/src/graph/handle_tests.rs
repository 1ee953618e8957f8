//! Tests for the graph handle.

use std::sync::Arc;

use serde_json::json;

use super::Graph;
use crate::error::Error;
use crate::frame::DataFrame;
use crate::query_runner::{CollectingQueryRunner, QueryRunner};
use crate::server_version::ServerVersion;

fn catalog_entry() -> DataFrame {
    DataFrame::from_columns(vec![
        ("graphName", vec![json!("g")]),
        ("database", vec![json!("neo4j")]),
        ("nodeCount", vec![json!(34)]),
        ("relationshipCount", vec![json!(156)]),
        ("density", vec![json!(0.139)]),
        ("memoryUsage", vec![json!("2 MiB")]),
        ("sizeInBytes", vec![json!(2_097_152)]),
        (
            "schema",
            vec![json!({
                "nodes": {
                    "Person": {"age": "Integer", "score": "Float"},
                    "Club": {"score": "Float"}
                },
                "relationships": {"KNOWS": {}, "MEMBER_OF": {}}
            })],
        ),
    ])
    .unwrap()
}

fn runner_with_catalog() -> CollectingQueryRunner {
    CollectingQueryRunner::new(ServerVersion::new(2, 5, 0))
        .with_result("CALL gds.graph.list($graph_name)", catalog_entry())
}

#[tokio::test]
async fn test_counts_and_sizes() {
    let runner = runner_with_catalog();
    let g = Graph::new("g", Arc::new(runner.clone()));

    assert_eq!(g.node_count().await.unwrap(), 34);
    assert_eq!(g.relationship_count().await.unwrap(), 156);
    assert_eq!(g.size_in_bytes().await.unwrap(), 2_097_152);
    assert_eq!(g.memory_usage().await.unwrap(), "2 MiB");
    assert_eq!(g.database().await.unwrap(), "neo4j");
    assert!((g.density().await.unwrap() - 0.139).abs() < f64::EPSILON);

    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.list($graph_name) YIELD database")
    );
}

#[tokio::test]
async fn test_schema_accessors() {
    let g = Graph::new("g", Arc::new(runner_with_catalog()));

    assert_eq!(g.node_labels().await.unwrap(), ["Club", "Person"]);
    assert_eq!(
        g.relationship_types().await.unwrap(),
        ["KNOWS", "MEMBER_OF"]
    );
    assert_eq!(
        g.node_properties(Some("Person")).await.unwrap(),
        ["age", "score"]
    );
    assert_eq!(g.node_properties(None).await.unwrap(), ["age", "score"]);

    let err = g.node_properties(Some("Movie")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn test_missing_graph() {
    let runner = CollectingQueryRunner::new(ServerVersion::new(2, 5, 0));
    runner.set_database("movies");
    let g = Graph::new("ghost", Arc::new(runner));

    match g.node_count().await.unwrap_err() {
        Error::GraphNotFound {
            graph_name,
            database,
        } => {
            assert_eq!(graph_name, "ghost");
            assert_eq!(database, "movies");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_exists_and_drop() {
    let runner = CollectingQueryRunner::new(ServerVersion::new(2, 5, 0)).with_result(
        "CALL gds.graph.exists",
        DataFrame::from_columns(vec![("exists", vec![json!(false)])]).unwrap(),
    );
    let g = Graph::new("g", Arc::new(runner.clone()));

    assert!(!g.exists().await.unwrap());
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.exists($graph_name) YIELD exists")
    );

    assert!(g.drop(false).await.unwrap().is_none());
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.drop($graph_name, $fail_if_missing)")
    );
}

#[test]
fn test_display() {
    let g = Graph::new(
        "karate",
        Arc::new(CollectingQueryRunner::new(ServerVersion::new(2, 5, 0))),
    );
    assert_eq!(g.to_string(), "Graph(karate)");
}
