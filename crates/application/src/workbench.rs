//! Workbench
//!
//! Owns one instance of every service and implements the request flow:
//! the builder resolves templates against the active environment, the proxy
//! client sends and records history, and the save pipeline persists the
//! builder and the last response.

use std::sync::Arc;

use courier_domain::{ResponseDescriptor, SavedRequest, SavedRequestRef};
use tracing::{info, warn};

use crate::auth::User;
use crate::collections::CollectionRepository;
use crate::context::AppContext;
use crate::environment_manager::EnvironmentManager;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CollectionBackend, CoreEvent, EnvironmentBackend, ProxyTransport};
use crate::proxy_client::{ProxyExecutionClient, SharedHistory};
use crate::request_builder::RequestBuilder;
use crate::save_load::{LoadedRequest, SaveInput, SavePipeline, SaveTarget, load};
use crate::variable_resolver::TemplateResolver;

/// Backends the workbench talks to.
pub struct Backends<T: ProxyTransport> {
    /// Collection, folder and saved-request endpoints.
    pub collections: Arc<dyn CollectionBackend>,
    /// Environment endpoints.
    pub environments: Arc<dyn EnvironmentBackend>,
    /// Transport used for sends.
    pub transport: Arc<T>,
}

/// The application state of one session.
pub struct Workbench<T: ProxyTransport> {
    context: AppContext,
    environments: EnvironmentManager,
    collections: CollectionRepository,
    pipeline: SavePipeline,
    client: ProxyExecutionClient<T>,
    resolver: TemplateResolver,
    request: RequestBuilder,
    response: Option<ResponseDescriptor>,
}

impl<T: ProxyTransport> Workbench<T> {
    /// Wires the services over the given backends and history.
    pub fn new(context: AppContext, backends: Backends<T>, history: SharedHistory) -> Self {
        Self {
            environments: EnvironmentManager::new(backends.environments, context.clone()),
            collections: CollectionRepository::new(backends.collections.clone(), context.clone()),
            pipeline: SavePipeline::new(backends.collections, context.clone()),
            client: ProxyExecutionClient::new(
                backends.transport,
                history,
                context.notifier.clone(),
            ),
            resolver: TemplateResolver,
            request: RequestBuilder::default(),
            response: None,
            context,
        }
    }

    /// Returns the session context.
    #[must_use]
    pub const fn context(&self) -> &AppContext {
        &self.context
    }

    /// Returns the environment manager.
    #[must_use]
    pub const fn environments(&self) -> &EnvironmentManager {
        &self.environments
    }

    /// Returns the environment manager for editing.
    pub const fn environments_mut(&mut self) -> &mut EnvironmentManager {
        &mut self.environments
    }

    /// Returns the collection repository.
    #[must_use]
    pub const fn collections(&self) -> &CollectionRepository {
        &self.collections
    }

    /// Returns the collection repository for editing.
    pub const fn collections_mut(&mut self) -> &mut CollectionRepository {
        &mut self.collections
    }

    /// Returns the request being composed.
    #[must_use]
    pub const fn request(&self) -> &RequestBuilder {
        &self.request
    }

    /// Returns the request being composed for editing.
    pub const fn request_mut(&mut self) -> &mut RequestBuilder {
        &mut self.request
    }

    /// Returns the last response view.
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseDescriptor> {
        self.response.as_ref()
    }

    /// Returns the shared send history.
    #[must_use]
    pub const fn history(&self) -> &SharedHistory {
        self.client.history()
    }

    /// Builds the current request against the active environment and sends
    /// it.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty URL and `UnresolvedTemplate` for
    /// unknown `{{key}}` tokens, both before anything is dispatched;
    /// `SendInFlight` while another send is outstanding. Transport problems
    /// come back as a `Network error` response, not as an error.
    pub async fn send(&mut self) -> ApplicationResult<&ResponseDescriptor> {
        let descriptor = self
            .request
            .build_descriptor(self.resolver, self.environments.active())?;
        let response = self.client.send(&descriptor).await?;
        Ok(self.response.insert(response))
    }

    /// Saves the current request and last response.
    ///
    /// # Errors
    ///
    /// See [`SavePipeline::save`].
    pub async fn save(
        &mut self,
        target: SaveTarget,
        folder_name: Option<&str>,
    ) -> ApplicationResult<SavedRequestRef> {
        let input = SaveInput {
            builder: &self.request,
            response: self.response.as_ref(),
            folder_name,
        };
        let result = self.pipeline.save(&mut self.collections, target, input).await;
        if let Err(e) = &result {
            self.context.notify(CoreEvent::OperationFailed {
                message: e.to_string(),
            });
        }
        result
    }

    /// Fetches a saved request and replaces the builder and response view
    /// with it.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the current state is kept.
    pub async fn open(&mut self, id: &str) -> ApplicationResult<()> {
        let loaded = self.pipeline.open(id).await?;
        self.apply(loaded);
        Ok(())
    }

    /// Replaces the builder and response view with a saved request.
    pub fn load(&mut self, saved: &SavedRequest) {
        self.apply(load(saved));
    }

    /// Stores the credentials, publishes them and loads the user's data.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Self::refresh`]; the session stays signed in.
    pub async fn sign_in(&mut self, token: &str, user: User) -> ApplicationResult<()> {
        self.context.local.set_auth(token, Some(&user));
        self.context.auth.sign_in(token, Some(user));
        info!("signed in");
        self.refresh().await
    }

    /// Forgets the credentials and every user-scoped cache.
    pub fn sign_out(&mut self) {
        self.context.local.clear_auth();
        self.context.auth.sign_out();
        self.environments.clear();
        info!("signed out");
    }

    /// Re-fetches the collections and environments of the signed-in user.
    ///
    /// An environment listing failure is logged; the collection listing
    /// error is returned.
    ///
    /// # Errors
    ///
    /// `AuthRequired` when no user is known, or the collection listing
    /// error.
    pub async fn refresh(&mut self) -> ApplicationResult<()> {
        let user = self
            .context
            .auth
            .user()
            .ok_or(ApplicationError::AuthRequired)?;

        if let Err(e) = self.environments.list_environments(&user.id).await {
            warn!(user_id = %user.id, error = %e, "failed to list environments");
        }
        self.collections.fetch_user_collections(&user.id).await?;
        Ok(())
    }

    fn apply(&mut self, loaded: LoadedRequest) {
        self.request = loaded.builder;
        self.response = loaded.response;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::proxy_client::shared_history;
    use crate::test_support::{FakeBackend, ScriptedTransport, context_with};
    use courier_domain::{HttpMethod, ResponseStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn workbench(
        backend: &Arc<FakeBackend>,
        transport: ScriptedTransport,
    ) -> Workbench<ScriptedTransport> {
        Workbench::new(
            context_with(true),
            Backends {
                collections: backend.clone(),
                environments: backend.clone(),
                transport: Arc::new(transport),
            },
            shared_history(),
        )
    }

    #[tokio::test]
    async fn test_unresolved_template_never_reaches_transport() {
        let backend = Arc::new(FakeBackend::default());
        let mut bench = workbench(&backend, ScriptedTransport::default());
        *bench.request_mut() = RequestBuilder::new(HttpMethod::Get, "https://{{host}}/users");

        let err = bench.send().await.unwrap_err();

        assert_eq!(
            err,
            ApplicationError::UnresolvedTemplate {
                keys: vec!["host".to_string()]
            }
        );
        assert!(bench.history().read().await.is_empty());
        assert!(bench.response().is_none());
    }

    #[tokio::test]
    async fn test_send_resolves_with_active_environment() {
        let backend = Arc::new(FakeBackend::default());
        let env_id = backend.seed_environment("u1", "Dev", &[("host", "api.test")]);
        let transport = ScriptedTransport::default().reply(200, json!({"ok": true}));
        let mut bench = workbench(&backend, transport);

        bench.sign_in("tok", User::new("u1")).await.unwrap();
        bench.environments_mut().select_environment(&env_id).await.unwrap();
        *bench.request_mut() = RequestBuilder::new(HttpMethod::Get, "https://{{host}}/users");
        bench.request_mut().add_param("q", "a b");

        let response = bench.send().await.unwrap();
        assert_eq!(response.status, ResponseStatus::Code(200));

        let history = bench.history().read().await;
        assert_eq!(
            history.latest().map(|e| e.url.as_str()),
            Some("https://api.test/users?q=a%20b")
        );
    }

    #[tokio::test]
    async fn test_save_after_send_persists_response() {
        let backend = Arc::new(FakeBackend::default());
        let transport = ScriptedTransport::default().reply(404, json!({"error": "nope"}));
        let mut bench = workbench(&backend, transport);
        *bench.request_mut() = RequestBuilder::new(HttpMethod::Get, "https://x.test/missing");

        bench.send().await.unwrap();
        let saved = bench
            .save(
                SaveTarget::New {
                    name: "Errors".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        let stored = backend
            .saved_requests()
            .into_iter()
            .find(|s| s.id == saved.id)
            .unwrap();
        assert_eq!(stored.status, Some(404));
        assert_eq!(stored.response.as_deref(), Some("{\n  \"error\": \"nope\"\n}"));
    }

    #[tokio::test]
    async fn test_open_replaces_builder_and_response() {
        let backend = Arc::new(FakeBackend::default());
        backend.seed_saved(SavedRequest {
            id: "api-9".to_string(),
            method: "PUT".to_string(),
            url: "https://x.test/items/1".to_string(),
            response: Some("done".to_string()),
            status: Some(200),
            ..SavedRequest::default()
        });
        let mut bench = workbench(&backend, ScriptedTransport::default());

        bench.open("api-9").await.unwrap();

        assert_eq!(bench.request().method, HttpMethod::Put);
        assert_eq!(bench.request().url, "https://x.test/items/1");
        assert_eq!(bench.response().map(|r| r.body.as_str()), Some("done"));
    }

    #[tokio::test]
    async fn test_sign_in_loads_and_sign_out_clears() {
        let backend = Arc::new(FakeBackend::default());
        backend.seed_environment("u1", "Dev", &[]);
        backend.seed_collection("u1", "Api");
        let mut bench = workbench(&backend, ScriptedTransport::default());

        bench.sign_in("tok", User::new("u1")).await.unwrap();
        assert_eq!(bench.environments().environments().len(), 1);
        assert_eq!(bench.collections().collections().len(), 1);
        assert_eq!(bench.context().local.auth().token.as_deref(), Some("tok"));

        bench.sign_out();
        assert!(bench.environments().environments().is_empty());
        assert!(!bench.context().auth.is_signed_in());
        assert_eq!(bench.context().local.auth().token, None);
    }

    #[tokio::test]
    async fn test_refresh_requires_user() {
        let backend = Arc::new(FakeBackend::default());
        let mut bench = workbench(&backend, ScriptedTransport::default());

        assert_eq!(bench.refresh().await.unwrap_err(), ApplicationError::AuthRequired);
        assert_eq!(backend.call_count(), 0);
    }
}
