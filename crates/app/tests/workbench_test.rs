//! End-to-end tests for the workbench wired over the real adapters.
//!
//! The backend REST API and the request targets are served by `wiremock`;
//! local state lives in the in-memory store.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_application::ports::{Dialog, KeyValueStore};
use courier_application::{
    AppContext, Backends, RequestBuilder, SaveTarget, User, Workbench, shared_history,
};
use courier_domain::{BodyType, HttpMethod, ResponseStatus};
use courier_infrastructure::{
    DirectTransport, MemoryKeyValueStore, RestBackend, SelectedTransport, TracingNotifier,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Yes;

#[async_trait]
impl Dialog for Yes {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }

    async fn prompt(&self, _message: &str, default: &str) -> Option<String> {
        Some(default.to_string())
    }
}

fn workbench(
    server: &MockServer,
    store: Arc<dyn KeyValueStore>,
    direct: bool,
) -> Workbench<SelectedTransport> {
    let context = AppContext::new(store, Arc::new(Yes), Arc::new(TracingNotifier));
    let backend = Arc::new(
        RestBackend::new(server.uri(), context.auth.clone(), Duration::from_secs(5)).unwrap(),
    );
    let transport = if direct {
        SelectedTransport::Direct(DirectTransport::new(Duration::from_secs(5)).unwrap())
    } else {
        SelectedTransport::Proxy(backend.clone())
    };
    Workbench::new(
        context,
        Backends {
            collections: backend.clone(),
            environments: backend,
            transport: Arc::new(transport),
        },
        shared_history(),
    )
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serves one user with collection `c1`, environment `e1` and variable
/// `base` pointing at `base`.
async fn mount_user_data(server: &MockServer, base: &str) {
    mount_get(
        server,
        "/api/paas/collection/getCollection/u1",
        json!({"data": [{"id": "c1", "title": "Users", "description": ""}]}),
    )
    .await;
    mount_get(server, "/api/paas/folder/c1/folder", json!({"data": []})).await;
    mount_get(server, "/api/paas/url/userapi", json!({"data": []})).await;
    mount_get(
        server,
        "/api/paas/env/getEnvCol/u1",
        json!({"data": [{"_id": "e1", "title": "Dev"}]}),
    )
    .await;
    mount_get(
        server,
        "/api/paas/env/getvariables/e1",
        json!({"data": [{"_id": "v1", "key": "base", "value": base}]}),
    )
    .await;
}

#[tokio::test]
async fn test_send_through_proxy_then_save_into_new_folder() {
    let server = MockServer::start().await;
    mount_user_data(&server, "https://target.test").await;

    Mock::given(method("POST"))
        .and(path("/api/paas/proxy"))
        .and(body_partial_json(json!({
            "method": "POST",
            "url": "https://target.test/users?page=2",
            "body": "{\"name\":\"ada\"}"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 201,
            "statusText": "Created",
            "timeMs": 42,
            "headers": {"x-request-id": "r1"},
            "body": {"id": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/paas/folder/create"))
        .and(body_partial_json(json!({"col_id": "c1", "name": "Create"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"_id": "f1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/paas/url/save"))
        .and(body_partial_json(json!({
            "f_id": "f1",
            "col_id": "c1",
            "url": "{{base}}/users?page=2",
            "method": "POST",
            "res_status": 201,
            "statusmessage": "Created"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "s1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut workbench = workbench(&server, Arc::new(MemoryKeyValueStore::new()), false);
    workbench.sign_in("tok", User::new("u1")).await.unwrap();
    assert_eq!(workbench.collections().collections().len(), 1);
    workbench
        .environments_mut()
        .select_environment("e1")
        .await
        .unwrap();

    let mut builder = RequestBuilder::new(HttpMethod::Post, "{{base}}/users")
        .with_body(BodyType::Json, "{\"name\":\"ada\"}");
    builder.add_param("page", "2");
    *workbench.request_mut() = builder;

    let response = workbench.send().await.unwrap();
    assert_eq!(response.status, ResponseStatus::Code(201));
    assert_eq!(response.status_line(), "201 Created");
    assert_eq!(response.time_ms, Some(42));
    assert_eq!(response.body, "{\n  \"id\": 7\n}");

    {
        let history = workbench.history().read().await;
        let entry = history.latest().unwrap();
        assert_eq!(entry.url, "https://target.test/users?page=2");
        assert_eq!(entry.status, ResponseStatus::Code(201));
    }

    let saved = workbench
        .save(SaveTarget::Existing("c1".to_string()), Some("Create"))
        .await
        .unwrap();
    assert_eq!(saved.id, "s1");
    assert_eq!(saved.folder_id.as_deref(), Some("f1"));
    assert_eq!(saved.url, "{{base}}/users?page=2");

    let collection = workbench.collections().get("c1").unwrap();
    assert_eq!(collection.folders.len(), 1);
    assert_eq!(collection.folders[0].apis, vec![saved]);
}

#[tokio::test]
async fn test_direct_transport_reaches_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut workbench = workbench(&server, Arc::new(MemoryKeyValueStore::new()), true);
    *workbench.request_mut() = RequestBuilder::new(HttpMethod::Get, format!("{}/health", server.uri()));

    let response = workbench.send().await.unwrap();
    assert_eq!(response.status_line(), "200 OK");
    assert_eq!(response.body, "ok");
    assert_eq!(workbench.history().read().await.len(), 1);
}

#[tokio::test]
async fn test_unreachable_proxy_becomes_network_error_response() {
    let server = MockServer::start().await;
    let mut workbench = workbench(&server, Arc::new(MemoryKeyValueStore::new()), false);
    drop(server);

    *workbench.request_mut() = RequestBuilder::new(HttpMethod::Get, "https://target.test/");
    let response = workbench.send().await.unwrap();

    assert_eq!(response.status, ResponseStatus::NetworkError);
    assert_eq!(response.status_line(), "Network error");
    assert_eq!(workbench.history().read().await.len(), 1);
}

#[tokio::test]
async fn test_session_survives_restart_until_sign_out() {
    let server = MockServer::start().await;
    mount_user_data(&server, "https://target.test").await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());

    let mut first = workbench(&server, store.clone(), false);
    first.sign_in("tok", User::new("u1")).await.unwrap();

    let mut second = workbench(&server, store.clone(), false);
    assert!(second.context().auth.is_signed_in());
    second.refresh().await.unwrap();
    assert_eq!(second.environments().environments().len(), 1);

    second.sign_out();
    assert!(second.environments().environments().is_empty());
    let third = workbench(&server, store, false);
    assert!(!third.context().auth.is_signed_in());
}
