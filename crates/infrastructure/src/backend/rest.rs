//! REST backend adapter using reqwest.
//!
//! Implements the collection and environment backend ports and the proxy
//! transport against the backend REST API. Every call carries the bearer
//! token of the current auth session, when there is one.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use courier_application::AuthSession;
use courier_application::ports::{
    BackendError, CollectionBackend, CollectionRecord, EnvironmentBackend, EnvironmentRecord,
    FolderRecord, NewSavedRequest, ProxyTransport, TransportError, TransportReply,
};
use courier_domain::request::form_json;
use courier_domain::{RequestDescriptor, RequestPayload, SavedRequest, Variable};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::wire;

/// Prefix of every backend endpoint.
const API_PREFIX: &str = "api/paas";

/// Backend REST client.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    auth: AuthSession,
}

/// Body of a proxy call.
#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    method: &'a str,
    url: &'a str,
    headers: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

impl RestBackend {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        base_url: impl Into<String>,
        auth: AuthSession,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("Courier/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url, auth))
    }

    /// Creates a backend over an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>, auth: AuthSession) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            auth,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a call and returns the decoded body of a successful reply.
    ///
    /// An empty or non-JSON success body decodes as `null`.
    async fn call(&self, builder: reqwest::RequestBuilder) -> Result<Value, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("failed to read body: {e}")))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        let message = wire::error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!(status = status.as_u16(), %message, "backend call failed");
        Err(BackendError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn get(&self, path: &str) -> Result<Value, BackendError> {
        self.call(self.request(Method::GET, path)).await
    }

    async fn send_json<T: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<Value, BackendError> {
        self.call(self.request(method, path).json(payload)).await
    }
}

#[async_trait]
impl CollectionBackend for RestBackend {
    async fn create_collection(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<String>, BackendError> {
        let body = self
            .send_json(
                Method::POST,
                "collection/userCollection",
                &json!({"title": title, "description": description}),
            )
            .await?;
        Ok(wire::created_id(&body, wire::COLLECTION_ID_KEYS))
    }

    async fn delete_collection(&self, id: &str) -> Result<(), BackendError> {
        self.call(self.request(Method::DELETE, &format!("collection/deleteCollection/{id}")))
            .await?;
        Ok(())
    }

    async fn list_collections(&self, user_id: &str) -> Result<Vec<CollectionRecord>, BackendError> {
        let body = self
            .get(&format!("collection/getCollection/{user_id}"))
            .await?;
        Ok(wire::data_list(&body)
            .iter()
            .filter_map(wire::collection_record)
            .collect())
    }

    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, BackendError> {
        let body = self.get(&format!("folder/{collection_id}/folder")).await?;
        Ok(wire::data_list(&body).iter().map(wire::folder_record).collect())
    }

    async fn create_folder(
        &self,
        collection_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<String>, BackendError> {
        let body = self
            .send_json(
                Method::POST,
                "folder/create",
                &json!({"col_id": collection_id, "name": name, "description": description}),
            )
            .await?;
        Ok(wire::created_id(&body, wire::FOLDER_ID_KEYS))
    }

    async fn list_saved_requests(&self) -> Result<Vec<SavedRequest>, BackendError> {
        let body = self.get("url/userapi").await?;
        Ok(wire::data_list(&body)
            .iter()
            .filter_map(wire::saved_request)
            .collect())
    }

    async fn fetch_saved_request(&self, id: &str) -> Result<SavedRequest, BackendError> {
        let body = self.get(&format!("url/{id}")).await?;
        wire::data(&body)
            .map(|data| wire::fetched_request(data, id))
            .ok_or_else(|| BackendError::Malformed(format!("saved request {id} has no data")))
    }

    async fn save_request(
        &self,
        request: &NewSavedRequest,
    ) -> Result<Option<String>, BackendError> {
        let body = self.send_json(Method::POST, "url/save", request).await?;
        Ok(wire::created_id(&body, wire::RECORD_ID_KEYS))
    }
}

#[async_trait]
impl EnvironmentBackend for RestBackend {
    async fn create_environment(&self, title: &str) -> Result<Option<String>, BackendError> {
        let body = self
            .send_json(Method::POST, "env/createEnv", &json!({"title": title}))
            .await?;
        Ok(wire::created_id(&body, wire::RECORD_ID_KEYS))
    }

    async fn list_environments(
        &self,
        user_id: &str,
    ) -> Result<Vec<EnvironmentRecord>, BackendError> {
        let body = self.get(&format!("env/getEnvCol/{user_id}")).await?;
        Ok(wire::data_list(&body)
            .iter()
            .filter_map(wire::environment_record)
            .collect())
    }

    async fn list_variables(&self, env_id: &str) -> Result<Vec<Variable>, BackendError> {
        let body = self.get(&format!("env/getvariables/{env_id}")).await?;
        Ok(wire::data_list(&body).iter().filter_map(wire::variable).collect())
    }

    async fn add_variable(&self, env_id: &str, key: &str, value: &str) -> Result<(), BackendError> {
        self.send_json(
            Method::POST,
            &format!("env/saveEnv/{env_id}"),
            &json!({"key": key, "value": value}),
        )
        .await?;
        Ok(())
    }

    async fn update_variable(
        &self,
        var_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        self.send_json(
            Method::PATCH,
            &format!("env/variable/{var_id}"),
            &json!({"key": key, "value": value}),
        )
        .await?;
        Ok(())
    }

    async fn delete_variable(&self, var_id: &str) -> Result<(), BackendError> {
        self.call(self.request(Method::DELETE, &format!("env/variable/{var_id}")))
            .await?;
        Ok(())
    }
}

impl ProxyTransport for RestBackend {
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<TransportReply, TransportError> {
        let payload = ProxyRequest {
            method: request.method.as_str(),
            url: &request.url,
            headers: &request.headers,
            body: request.body.as_ref().map(proxy_body),
        };
        debug!(method = payload.method, url = payload.url, "sending through proxy");

        let response = self
            .request(Method::POST, "proxy")
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::new("Failed to reach the proxy", e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new("Failed to read the proxy reply", e.to_string()))?;

        Ok(TransportReply::Proxied {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            text,
        })
    }
}

/// Raw bodies travel as a string, form bodies as their parsed JSON (or
/// the text itself when it does not parse).
fn proxy_body(payload: &RequestPayload) -> Value {
    match payload {
        RequestPayload::Raw(text) => Value::String(text.clone()),
        RequestPayload::Form(text) => form_json(text),
    }
}
