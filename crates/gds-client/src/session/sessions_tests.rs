//! Tests for session management against a mock Aura API and Query API.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{instance_name, session_name, DbmsConnectionInfo, GdsSessions, SessionMemory};
use crate::config::AuraConfig;
use crate::error::Error;

async fn setup() -> (MockServer, GdsSessions) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let sessions = GdsSessions::new(&AuraConfig {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        tenant: Some("t1".to_string()),
        base_url: server.uri(),
        request_timeout_secs: 5,
    })
    .unwrap()
    .with_wait(Duration::from_millis(10), Duration::from_secs(1));

    (server, sessions)
}

fn summary(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "tenant_id": "t1", "cloud_provider": "gcp"})
}

fn details(id: &str, name: &str, status: &str, connection_url: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "tenant_id": "t1",
        "cloud_provider": "gcp",
        "status": status,
        "connection_url": connection_url,
        "memory": "8GB",
        "region": "europe-west1",
        "type": "professional-ds"
    })
}

async fn mount_instances(server: &MockServer, instances: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/v1/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": instances })))
        .mount(server)
        .await;
}

async fn mount_instance(server: &MockServer, instance: Value) {
    let id = instance["id"].as_str().unwrap().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/v1/instances/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": instance })))
        .mount(server)
        .await;
}

async fn mount_tenant(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/tenants/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "t1",
                "instance_configurations": [
                    {"cloud_provider": "gcp", "region": "europe-west1", "type": "professional-ds"},
                    {"cloud_provider": "gcp", "region": "us-central1", "type": "professional-ds"}
                ]
            }
        })))
        .mount(server)
        .await;
}

async fn mount_gds_version(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/db/neo4j/query/v2"))
        .and(body_string_contains("gds.version()"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "data": {"fields": ["version"], "values": [["2.6.0"]]}
        })))
        .mount(server)
        .await;
}

fn db_connection(server: &MockServer) -> DbmsConnectionInfo {
    DbmsConnectionInfo::new(&server.uri(), "neo4j", "db-password")
}

#[test]
fn test_instance_naming() {
    assert_eq!(instance_name("mine"), "gds-session-mine");
    assert_eq!(session_name("gds-session-mine"), Some("mine"));
    assert_eq!(session_name("production-db"), None);
}

#[tokio::test]
async fn test_list_only_returns_sessions() {
    let (server, sessions) = setup().await;
    mount_instances(
        &server,
        vec![summary("a", "gds-session-one"), summary("b", "production-db")],
    )
    .await;
    mount_instance(&server, details("a", "gds-session-one", "running", "")).await;

    let listed = sessions.list().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "one");
    assert_eq!(listed[0].size, "8GB");
}

#[tokio::test]
async fn test_delete_missing_session() {
    let (server, sessions) = setup().await;
    mount_instances(&server, vec![summary("b", "production-db")]).await;

    assert!(!sessions.delete("one").await.unwrap());
}

#[tokio::test]
async fn test_delete_session() {
    let (server, sessions) = setup().await;
    mount_instances(&server, vec![summary("a", "gds-session-one")]).await;
    Mock::given(method("DELETE"))
        .and(path("/v1/instances/a"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "data": details("a", "gds-session-one", "destroying", "")
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(sessions.delete("one").await.unwrap());
}

#[tokio::test]
async fn test_ambiguous_session_name() {
    let (server, sessions) = setup().await;
    mount_instances(
        &server,
        vec![summary("a", "gds-session-one"), summary("b", "gds-session-one")],
    )
    .await;

    let err = sessions.delete("one").await.unwrap_err();
    assert!(matches!(err, Error::Session(ref m) if m.contains("exactly one")));
}

#[tokio::test]
async fn test_set_cloud_location_is_validated() {
    let (server, mut sessions) = setup().await;
    mount_tenant(&server).await;

    let err = sessions.set_cloud_location("aws", "eu-west-1").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("gcp")));

    let err = sessions
        .set_cloud_location("gcp", "asia-east1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("europe-west1")));

    sessions.set_cloud_location("gcp", "us-central1").await.unwrap();
    assert_eq!(sessions.cloud_location().unwrap().region, "us-central1");
}

#[tokio::test]
async fn test_get_or_create_connects_to_existing_session() {
    let (server, sessions) = setup().await;
    mount_instances(&server, vec![summary("a", "gds-session-one")]).await;
    mount_instance(&server, details("a", "gds-session-one", "running", &server.uri())).await;
    mount_gds_version(&server).await;

    let gds = sessions
        .get_or_create("one", SessionMemory::Gb8, &db_connection(&server))
        .await
        .unwrap();

    assert_eq!(gds.session_name(), "one");
    assert_eq!(gds.server_version().to_string(), "2.6.0");
}

#[tokio::test]
async fn test_get_or_create_needs_location_for_self_managed_db() {
    let (server, sessions) = setup().await;
    mount_instances(&server, vec![]).await;

    let err = sessions
        .get_or_create("one", SessionMemory::Gb8, &db_connection(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn test_get_or_create_creates_session() {
    let (server, mut sessions) = setup().await;
    mount_tenant(&server).await;
    mount_instances(&server, vec![]).await;
    Mock::given(method("POST"))
        .and(path("/v1/instances"))
        .and(body_partial_json(json!({
            "name": "gds-session-one",
            "memory": "16GB",
            "cloud_provider": "gcp",
            "region": "europe-west1"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "data": {
                "id": "new1",
                "name": "gds-session-one",
                "tenant_id": "t1",
                "cloud_provider": "gcp",
                "username": "neo4j",
                "password": "initial"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_instance(&server, details("new1", "gds-session-one", "running", &server.uri())).await;
    Mock::given(method("POST"))
        .and(path("/db/system/query/v2"))
        .and(body_partial_json(json!({
            "parameters": {"old_pw": "initial", "new_pw": "db-password"}
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "data": {"fields": [], "values": []}
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_gds_version(&server).await;

    sessions.set_cloud_location("gcp", "europe-west1").await.unwrap();
    let gds = sessions
        .get_or_create("one", SessionMemory::Gb16, &db_connection(&server))
        .await
        .unwrap();

    assert_eq!(gds.session_name(), "one");
}
