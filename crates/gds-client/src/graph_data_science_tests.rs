//! Tests for namespace routing from the client entry point.

use std::sync::Arc;

use serde_json::json;

use crate::error::Error;
use crate::frame::DataFrame;
use crate::graph::Graph;
use crate::query_runner::CollectingQueryRunner;
use crate::server_version::ServerVersion;
use crate::GraphDataScience;

fn client(version: ServerVersion) -> (CollectingQueryRunner, GraphDataScience) {
    let runner = CollectingQueryRunner::new(version);
    let gds = GraphDataScience::from_runner(Arc::new(runner.clone()));
    (runner, gds)
}

#[tokio::test]
async fn test_tiers_build_dotted_names() {
    let (runner, gds) = client(ServerVersion::new(2, 5, 0));
    runner.add_result(
        "CALL gds.beta.graph.project.subgraph",
        DataFrame::from_columns(vec![("graphName", vec![json!("sub")])]).unwrap(),
    );
    let g = Graph::new("g", gds.runner().clone());

    gds.beta()
        .graph()
        .project()
        .subgraph("sub", &g, "n:A", "*", json!(null))
        .await
        .unwrap();
    assert!(runner
        .last_query()
        .unwrap()
        .starts_with("CALL gds.beta.graph.project.subgraph("));

    gds.alpha().endpoint("linkprediction.adamicAdar").call(&g, json!({})).await.unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.alpha.linkprediction.adamicAdar($graph_name, $config)")
    );

    gds.endpoint("wcc").stream(&g, json!(null)).await.unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.wcc.stream($graph_name, $config)")
    );
}

#[tokio::test]
async fn test_model_catalog_follows_server_version() {
    let (old_runner, old) = client(ServerVersion::new(2, 4, 0));
    old.model().list(None).await.unwrap();
    assert_eq!(
        old_runner.last_query().as_deref(),
        Some("CALL gds.beta.model.list()")
    );

    let (new_runner, new) = client(ServerVersion::new(2, 5, 0));
    new.model().list(None).await.unwrap();
    assert_eq!(new_runner.last_query().as_deref(), Some("CALL gds.model.list()"));
}

#[tokio::test]
async fn test_version_and_list() {
    let (runner, gds) = client(ServerVersion::new(2, 6, 0));
    runner.add_result(
        "RETURN gds.version()",
        DataFrame::from_columns(vec![("version", vec![json!("2.6.1")])]).unwrap(),
    );

    assert_eq!(gds.version().await.unwrap(), "2.6.1");

    gds.list(Some("pageRank")).await.unwrap();
    assert_eq!(runner.last_query().as_deref(), Some("CALL gds.list($name)"));
    gds.list(None).await.unwrap();
    assert_eq!(runner.last_query().as_deref(), Some("CALL gds.list()"));
}

#[tokio::test]
async fn test_database_selection_is_forwarded() {
    let (runner, gds) = client(ServerVersion::new(2, 6, 0));

    gds.set_database("movies");
    gds.run_cypher("MATCH (n) RETURN count(n)", None, None)
        .await
        .unwrap();

    assert_eq!(gds.database().as_deref(), Some("movies"));
    assert_eq!(runner.last_database(), None);

    gds.run_cypher("RETURN 1", None, Some("system")).await.unwrap();
    assert_eq!(runner.last_database().as_deref(), Some("system"));
}

#[tokio::test]
async fn test_direct_system_endpoints_are_gated() {
    let (runner, gds) = client(ServerVersion::new(2, 4, 0));

    let err = gds.system_monitor().await.unwrap_err();
    assert!(matches!(err, Error::IncompatibleServerVersion { .. }));

    gds.alpha().system_monitor().await.ok();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.alpha.systemMonitor()")
    );

    gds.beta().list_progress(Some("job")).await.unwrap();
    assert_eq!(
        runner.last_query().as_deref(),
        Some("CALL gds.beta.listProgress($job_id)")
    );
}

#[tokio::test]
async fn test_graph_sage_through_beta() {
    let (runner, gds) = client(ServerVersion::new(2, 5, 0));
    runner.add_result(
        "CALL gds.beta.graphSage.train",
        DataFrame::from_columns(vec![("modelInfo", vec![json!({"modelName": "m"})])]).unwrap(),
    );
    let g = Graph::new("g", gds.runner().clone());

    let (model, _) = gds
        .beta()
        .graph_sage()
        .train(&g, json!({"modelName": "m"}))
        .await
        .unwrap();

    assert_eq!(model.name(), "m");
}
