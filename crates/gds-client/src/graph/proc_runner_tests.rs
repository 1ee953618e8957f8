//! Tests for the `gds.graph` endpoints.

use std::sync::Arc;

use serde_json::json;

use super::{Graph, GraphProcRunner};
use crate::call::Strings;
use crate::error::Error;
use crate::frame::DataFrame;
use crate::namespace::EndpointContext;
use crate::query_runner::CollectingQueryRunner;
use crate::server_version::ServerVersion;

fn setup(version: ServerVersion, namespace: &str) -> (CollectingQueryRunner, GraphProcRunner) {
    let runner = CollectingQueryRunner::new(version);
    let ctx = EndpointContext::new(Arc::new(runner.clone()), namespace);
    (runner, GraphProcRunner::new(ctx))
}

fn graph(runner: &CollectingQueryRunner, name: &str) -> Graph {
    Graph::new(name, Arc::new(runner.clone()))
}

fn one_row(pairs: Vec<(&str, serde_json::Value)>) -> DataFrame {
    DataFrame::from_columns(pairs.into_iter().map(|(k, v)| (k, vec![v]))).unwrap()
}

#[tokio::test]
async fn test_project_builds_namespaced_call() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.project(",
        one_row(vec![("graphName", json!("g")), ("nodeCount", json!(3))]),
    );

    let created = gds
        .project()
        .call("g", json!("Person"), json!("KNOWS"), json!({"concurrency": 2}))
        .await
        .unwrap();

    assert_eq!(created.graph.name(), "g");
    assert_eq!(created.result["nodeCount"], json!(3));
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.project($graph_name, $node_spec, $relationship_spec, $config)")
    );
    let config = &runner.last_params().unwrap().to_json()["config"];
    assert_eq!(config["concurrency"], json!(2));
}

#[tokio::test]
async fn test_beta_namespace_is_kept() {
    let (runner, gds) = setup(ServerVersion::new(2, 0, 0), "gds.beta.graph");
    runner.add_result(
        "CALL gds.beta.graph.project.subgraph",
        one_row(vec![("graphName", json!("sub"))]),
    );
    let from = graph(&runner, "g");

    gds.project()
        .subgraph("sub", &from, "n:A", "*", json!({}))
        .await
        .unwrap();

    assert_eq!(
        runner.last_query().as_deref(),
        Some(
            "CALL gds.beta.graph.project.subgraph($graph_name, $from_graph_name, $node_filter, \
             $relationship_filter, $config)"
        )
    );
}

#[tokio::test]
async fn test_cypher_projection_estimate() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.project.cypher.estimate",
        one_row(vec![("requiredMemory", json!("1 MiB"))]),
    );

    let row = gds
        .cypher()
        .estimate("MATCH (n) RETURN id(n) AS id", "MATCH (a)-->(b) RETURN id(a) AS source, id(b) AS target", json!(null))
        .await
        .unwrap();

    assert_eq!(row["requiredMemory"], json!("1 MiB"));
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.project.cypher.estimate($node_query, $relationship_query, $config)")
    );
}

#[tokio::test]
async fn test_construct_reports_all_errors() {
    let (runner, gds) = setup(ServerVersion::new(2, 2, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.exists($graph_name) YIELD exists",
        one_row(vec![("exists", json!(true))]),
    );

    let nodes = one_row(vec![("id", json!(0))]);
    let rels = one_row(vec![("sourceNodeId", json!(0))]);

    let err = gds
        .construct("g", vec![nodes], vec![rels], 4, vec!["R".to_string()])
        .await
        .unwrap_err();

    let Error::InvalidArgument(message) = err else {
        panic!("unexpected error: {err:?}");
    };
    let problems: Vec<&str> = message.lines().collect();
    assert_eq!(problems.len(), 4);
    assert!(problems[0].contains("already exists"));
    assert!(problems[1].contains("'nodeId'"));
    assert!(problems[2].contains("'targetNodeId'"));
    assert!(problems[3].contains("2.3.0"));
}

#[tokio::test]
async fn test_construct_skips_empty_frames() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    let nodes = one_row(vec![("nodeId", json!(0))]);
    let empty = DataFrame::empty(["whatever"]);

    let g = gds
        .construct("g", vec![nodes, empty.clone()], vec![empty], 4, Vec::new())
        .await
        .unwrap();

    assert_eq!(g.name(), "g");
    let data = runner.last_params().unwrap().to_json()["data"].clone();
    assert_eq!(data, json!([[0, null, null, null, null, null]]));
}

#[tokio::test]
async fn test_construct_is_gated_and_client_only() {
    let (_, old) = setup(ServerVersion::new(2, 0, 0), "gds.graph");
    let err = old
        .construct("g", Vec::new(), Vec::new(), 4, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IncompatibleServerVersion { .. }));

    let (_, alpha) = setup(ServerVersion::new(2, 5, 0), "gds.alpha.graph");
    let err = alpha
        .construct("g", Vec::new(), Vec::new(), 4, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[tokio::test]
async fn test_load_karate_club() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");

    gds.load_karate_club("karate", true).await.unwrap();

    let params = runner.last_params().unwrap().to_json();
    assert_eq!(params["data"].as_array().unwrap().len(), 34 + 78);
    assert_eq!(
        params["configuration"]["undirectedRelationshipTypes"],
        json!(["*"])
    );
}

#[tokio::test]
async fn test_sample_version_gates() {
    let (runner, gds) = setup(ServerVersion::new(2, 3, 0), "gds.graph");
    let from = graph(&runner, "g");

    let err = gds
        .sample()
        .cnarw("s", &from, json!({}))
        .await
        .unwrap_err();
    match err {
        Error::IncompatibleServerVersion { endpoint, .. } => {
            assert_eq!(endpoint, "gds.graph.sample.cnarw");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    runner.add_result(
        "CALL gds.graph.sample.rwr",
        one_row(vec![("graphName", json!("s"))]),
    );
    let created = gds.sample().rwr("s", &from, json!({})).await.unwrap();
    assert_eq!(created.graph.name(), "s");
}

#[tokio::test]
async fn test_generate_gate_depends_on_namespace() {
    let (_, gds) = setup(ServerVersion::new(2, 4, 0), "gds.graph");
    let err = gds.generate("g", 10, 2, json!({})).await.unwrap_err();
    assert!(matches!(err, Error::IncompatibleServerVersion { .. }));
    assert!(gds.graph_property().is_err());
    assert!(gds.node_label().is_err());

    let (runner, beta) = setup(ServerVersion::new(2, 4, 0), "gds.beta.graph");
    runner.add_result(
        "CALL gds.beta.graph.generate",
        one_row(vec![("name", json!("g"))]),
    );
    let created = beta.generate("g", 10, 2, json!({})).await.unwrap();
    assert_eq!(created.result["name"], json!("g"));
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.beta.graph.generate($graph_name, $node_count, $average_degree, $config)")
    );

    let (runner, beta) = setup(ServerVersion::new(3, 0, 0), "gds.beta.graph");
    let err = beta.generate("g", 10, 2, json!({})).await.unwrap_err();
    assert!(matches!(
        err,
        Error::IncompatibleServerVersion { ref endpoint, .. } if endpoint == "gds.beta.graph.generate"
    ));
    assert!(runner.queries().is_empty());
}

#[tokio::test]
async fn test_tiered_forms_are_gated_or_rejected() {
    let (runner, alpha) = setup(ServerVersion::new(2, 4, 0), "gds.alpha.graph");
    let from = graph(&runner, "from");

    let err = alpha.generate("g", 10, 2, json!({})).await.unwrap_err();
    assert!(matches!(err, Error::Unsupported(ref m) if m.contains("gds.graph.generate or gds.beta.graph.generate")));

    let (runner, beta) = setup(ServerVersion::new(2, 6, 0), "gds.beta.graph");
    let err = beta
        .filter("g", &from, "*", "*", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(ref m) if m.contains("gds.beta.graph.filter")));
    assert!(runner.queries().is_empty());

    assert!(alpha.graph_property().is_ok());
    assert!(alpha.node_label().is_ok());

    let (_, old_alpha) = setup(ServerVersion::new(2, 2, 0), "gds.alpha.graph");
    assert!(matches!(
        old_alpha.node_label(),
        Err(Error::IncompatibleServerVersion { .. })
    ));

    let (_, new_alpha) = setup(ServerVersion::new(3, 0, 0), "gds.alpha.graph");
    assert!(new_alpha.graph_property().is_err());
}

#[tokio::test]
async fn test_drop_with_and_without_username() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    let g = graph(&runner, "g");

    assert!(gds.drop(&g, false, "", None).await.unwrap().is_none());
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.drop($graph_name, $fail_if_missing, $db_name)")
    );

    runner.add_result(
        "CALL gds.graph.drop",
        one_row(vec![("graphName", json!("g"))]),
    );
    let dropped = gds.drop(&g, true, "neo4j", Some("alice")).await.unwrap();
    assert_eq!(dropped.unwrap()["graphName"], json!("g"));
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.drop($graph_name, $fail_if_missing, $db_name, $username)")
    );
}

#[tokio::test]
async fn test_list_without_graph_uses_plain_call() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.beta.graph");
    gds.list(None).await.unwrap();
    assert_eq!(runner.last_query().as_deref(), Some("CALL gds.graph.list()"));

    let g = graph(&runner, "g");
    gds.list(Some(&g)).await.unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.beta.graph.list($graph_name)")
    );
}

#[tokio::test]
async fn test_get_missing_graph() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    let err = gds.get("nope").await.unwrap_err();
    assert!(matches!(err, Error::GraphNotFound { ref graph_name, .. } if graph_name == "nope"));

    runner.add_result(
        "CALL gds.graph.list($graph_name) YIELD graphName",
        one_row(vec![("graphName", json!("g"))]),
    );
    assert_eq!(gds.get("g").await.unwrap().name(), "g");
}

#[tokio::test]
async fn test_stream_node_properties_pivots_long_result() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.streamNodeProperties",
        DataFrame::from_columns(vec![
            ("nodeId", vec![json!(0), json!(0), json!(1), json!(1)]),
            ("nodeProperty", vec![json!("a"), json!("b"), json!("a"), json!("b")]),
            ("propertyValue", vec![json!(1), json!(2), json!(3), json!(4)]),
        ])
        .unwrap(),
    );
    let g = graph(&runner, "g");

    let wide = gds
        .stream_node_properties(&g, &["a", "b"], Strings::all(), true, json!({}))
        .await
        .unwrap();
    assert_eq!(wide.columns(), ["nodeId", "a", "b"]);
    assert_eq!(wide.len(), 2);
    assert_eq!(wide.row(1).unwrap()["b"], json!(4));

    let params = runner.last_params().unwrap().to_json();
    assert_eq!(params["entities"], json!(["*"]));
    assert_eq!(params["properties"], json!(["a", "b"]));

    let long = gds
        .stream_node_properties(&g, &["a", "b"], "Person", false, json!({}))
        .await
        .unwrap();
    assert_eq!(long.columns(), ["nodeId", "nodeProperty", "propertyValue"]);
    assert_eq!(runner.last_params().unwrap().to_json()["entities"], json!("Person"));
}

#[tokio::test]
async fn test_stream_relationship_properties_melts_wide_result() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.streamRelationshipProperties",
        DataFrame::from_columns(vec![
            ("sourceNodeId", vec![json!(0)]),
            ("targetNodeId", vec![json!(1)]),
            ("relationshipType", vec![json!("R")]),
            ("w", vec![json!(0.5)]),
            ("x", vec![json!(7)]),
        ])
        .unwrap(),
    );
    let g = graph(&runner, "g");

    let long = gds
        .stream_relationship_properties(&g, &["w", "x"], Strings::all(), false, json!({}))
        .await
        .unwrap();

    assert_eq!(
        long.columns(),
        [
            "sourceNodeId",
            "targetNodeId",
            "relationshipType",
            "relationshipProperty",
            "propertyValue"
        ]
    );
    assert_eq!(long.len(), 2);
    assert_eq!(long.row(0).unwrap()["relationshipProperty"], json!("w"));
    assert_eq!(long.row(1).unwrap()["propertyValue"], json!(7));
}

#[tokio::test]
async fn test_remove_node_properties_overloads() {
    let (runner, gds) = setup(ServerVersion::new(2, 1, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.removeNodeProperties",
        one_row(vec![("propertiesRemoved", json!(4))]),
    );
    let g = graph(&runner, "g");

    let row = gds
        .remove_node_properties(&g, &["pr"], json!({}))
        .await
        .unwrap();
    assert_eq!(row["propertiesRemoved"], json!(4));
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.graph.removeNodeProperties($graph_name, $properties, $config)")
    );

    let err = gds
        .remove_node_properties_for_labels(&g, &["pr"], ["A"], json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IncompatibleServerVersion { .. }));
}

#[tokio::test]
async fn test_write_relationship_defaults_to_no_property() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    runner.add_result(
        "CALL gds.graph.writeRelationship",
        one_row(vec![("relationshipsWritten", json!(12))]),
    );
    let g = graph(&runner, "g");

    gds.write_relationship(&g, "SIMILAR", "", json!(null))
        .await
        .unwrap();

    let params = runner.last_params().unwrap().to_json();
    assert_eq!(params["relationship_property"], json!(""));
    assert_eq!(params["config"], json!({}));
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_calling() {
    let (runner, gds) = setup(ServerVersion::new(2, 5, 0), "gds.graph");
    let g = graph(&runner, "g");

    let err = gds
        .write_relationship(&g, "SIMILAR", "", json!([1, 2]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(runner.queries().is_empty());
}
