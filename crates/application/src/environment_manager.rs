//! Environment Manager
//!
//! Owns the environments of the signed-in user and the selection of at most
//! one active environment. Every variable mutation goes to the backend first
//! and then re-fetches the full variable list of the affected environment.

use std::sync::Arc;

use courier_domain::{Environment, Variable};
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CoreEvent, EnvironmentBackend};

/// Session cache of environments plus the active selection.
pub struct EnvironmentManager {
    backend: Arc<dyn EnvironmentBackend>,
    context: AppContext,
    environments: Vec<Environment>,
    active_id: Option<String>,
}

impl EnvironmentManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new(backend: Arc<dyn EnvironmentBackend>, context: AppContext) -> Self {
        Self {
            backend,
            context,
            environments: Vec::new(),
            active_id: None,
        }
    }

    /// Returns the cached environments.
    #[must_use]
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Returns the active environment.
    #[must_use]
    pub fn active(&self) -> Option<&Environment> {
        let id = self.active_id.as_deref()?;
        self.environments.iter().find(|env| env.id == id)
    }

    /// Returns the id of the active environment.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Forgets every environment, e.g. on sign-out.
    pub fn clear(&mut self) {
        self.environments.clear();
        self.active_id = None;
    }

    /// Fetches the environment list of a user.
    ///
    /// Variables already cached for a surviving environment are kept. The
    /// selection is dropped if its environment disappeared.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the cache is left untouched.
    pub async fn list_environments(&mut self, user_id: &str) -> ApplicationResult<&[Environment]> {
        let records = self.backend.list_environments(user_id).await?;
        debug!(user_id, count = records.len(), "fetched environments");

        let previous = std::mem::take(&mut self.environments);
        self.environments = records
            .into_iter()
            .map(|record| {
                let variables = previous
                    .iter()
                    .find(|env| env.id == record.id)
                    .map(|env| env.variables.clone())
                    .unwrap_or_default();
                Environment {
                    id: record.id,
                    title: record.title,
                    variables,
                }
            })
            .collect();

        if self.active().is_none() {
            self.active_id = None;
        }
        Ok(&self.environments)
    }

    /// Creates an environment, makes it active and loads its variables.
    ///
    /// Returns the id of the new environment when it could be determined.
    ///
    /// # Errors
    ///
    /// `AuthRequired` without a token (no call is made), `ValidationError`
    /// for an empty title, or the backend error.
    pub async fn create_environment(&mut self, title: &str) -> ApplicationResult<Option<String>> {
        if !self.context.auth.is_signed_in() {
            return Err(ApplicationError::AuthRequired);
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(ApplicationError::ValidationError(
                "environment title is required".to_string(),
            ));
        }

        let server_id = self.backend.create_environment(title).await?;

        if let Some(user) = self.context.auth.user()
            && let Err(e) = self.list_environments(&user.id).await
        {
            warn!(error = %e, "failed to refresh environments after create");
        }

        let new_id = server_id.or_else(|| {
            self.environments
                .iter()
                .rev()
                .find(|env| env.title == title)
                .map(|env| env.id.clone())
        });

        if let Some(id) = &new_id {
            info!(env_id = %id, title, "environment created");
            if !self.environments.iter().any(|env| &env.id == id) {
                self.environments.push(Environment::new(id.clone(), title));
            }
            self.active_id = Some(id.clone());
            self.refresh_variables(id).await;
            self.context
                .notify(CoreEvent::EnvironmentCreated { id: id.clone() });
        }
        Ok(new_id)
    }

    /// Makes an environment active and fetches its variables.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or the backend error. On failure the
    /// previous selection stays in place.
    pub async fn select_environment(&mut self, id: &str) -> ApplicationResult<&Environment> {
        let index = self.index_of(id)?;
        let variables = self.backend.list_variables(id).await?;
        debug!(env_id = id, count = variables.len(), "selected environment");

        self.environments[index].variables = variables;
        self.active_id = Some(id.to_string());
        Ok(&self.environments[index])
    }

    /// Fetches the variables of an environment.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or the backend error.
    pub async fn list_variables(&mut self, env_id: &str) -> ApplicationResult<&[Variable]> {
        let index = self.index_of(env_id)?;
        let variables = self.backend.list_variables(env_id).await?;
        self.environments[index].variables = variables;
        Ok(&self.environments[index].variables)
    }

    /// Adds a variable and re-fetches the environment's variables.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty or already used key, `NotFound` for
    /// an unknown environment, or the backend error.
    pub async fn add_variable(
        &mut self,
        env_id: &str,
        key: &str,
        value: &str,
    ) -> ApplicationResult<()> {
        let index = self.index_of(env_id)?;
        let key = validate_key(key)?;
        if self.environments[index].key_taken(key, None) {
            return Err(duplicate_key(key));
        }

        self.backend.add_variable(env_id, key, value).await?;
        debug!(env_id, key, "variable added");
        self.refresh_variables(env_id).await;
        Ok(())
    }

    /// Updates a variable and re-fetches its environment's variables.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty key or one used by another variable,
    /// `NotFound` when no environment is known, or the backend error.
    pub async fn update_variable(
        &mut self,
        var_id: &str,
        key: &str,
        value: &str,
    ) -> ApplicationResult<()> {
        let env_id = self.owner_of(var_id)?;
        let key = validate_key(key)?;
        let taken = self
            .environments
            .iter()
            .find(|env| env.id == env_id)
            .is_some_and(|env| env.key_taken(key, Some(var_id)));
        if taken {
            return Err(duplicate_key(key));
        }

        self.backend.update_variable(var_id, key, value).await?;
        debug!(env_id = %env_id, var_id, "variable updated");
        self.refresh_variables(&env_id).await;
        Ok(())
    }

    /// Deletes a variable after confirmation and re-fetches its
    /// environment's variables.
    ///
    /// Returns `false` when the user declined.
    ///
    /// # Errors
    ///
    /// `NotFound` when no environment is known, or the backend error.
    pub async fn delete_variable(&mut self, var_id: &str) -> ApplicationResult<bool> {
        let env_id = self.owner_of(var_id)?;
        let key = self
            .environments
            .iter()
            .find_map(|env| env.variable(var_id))
            .map_or_else(|| var_id.to_string(), |v| v.key.clone());

        if !self
            .context
            .dialog
            .confirm(&format!("Delete variable {key}?"))
            .await
        {
            return Ok(false);
        }

        self.backend.delete_variable(var_id).await?;
        debug!(env_id = %env_id, var_id, "variable deleted");
        self.refresh_variables(&env_id).await;
        Ok(true)
    }

    fn index_of(&self, env_id: &str) -> ApplicationResult<usize> {
        self.environments
            .iter()
            .position(|env| env.id == env_id)
            .ok_or_else(|| ApplicationError::NotFound(format!("environment {env_id}")))
    }

    /// The environment holding the variable, falling back to the active one.
    fn owner_of(&self, var_id: &str) -> ApplicationResult<String> {
        self.environments
            .iter()
            .find(|env| env.variable(var_id).is_some())
            .map(|env| env.id.clone())
            .or_else(|| self.active_id.clone())
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {var_id}")))
    }

    async fn refresh_variables(&mut self, env_id: &str) {
        match self.backend.list_variables(env_id).await {
            Ok(variables) => {
                if let Some(env) = self.environments.iter_mut().find(|env| env.id == env_id) {
                    env.variables = variables;
                }
            }
            Err(e) => warn!(env_id, error = %e, "failed to refresh variables"),
        }
    }
}

fn validate_key(key: &str) -> ApplicationResult<&str> {
    let key = key.trim();
    if key.is_empty() {
        Err(ApplicationError::ValidationError(
            "variable key is required".to_string(),
        ))
    } else {
        Ok(key)
    }
}

fn duplicate_key(key: &str) -> ApplicationError {
    ApplicationError::ValidationError(format!("variable key '{key}' already exists"))
}
