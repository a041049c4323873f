//! Session lifecycle: sign-in, registration, sign-out, and the single
//! execute path every request flows through.
//!
//! A [`SessionContext`] wires the outbound pipeline, the renewal
//! coordinator, and the inbound interceptor around one shared HTTP client.
//! The client's cookie store carries the HttpOnly refresh credential, so
//! renewal works without this code ever touching the cookie.
//!
//! "Signed in" means exactly "a token is held": validity is the server's
//! call, and a stale restored token simply gets renewed on first use.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::api::{ApiError, RequestDescriptor, RequestPipeline, ResponseInterceptor};
use crate::config::Config;
use super::refresh::RefreshCoordinator;
use super::token_store::TokenStore;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Process-wide session facade.
///
/// Constructed once at startup and shared; clones reference the same
/// token slot and renewal state. Consumers go through [`ApiClient`]
/// rather than holding this directly.
///
/// [`ApiClient`]: crate::api::ApiClient
#[derive(Clone)]
pub struct SessionContext {
    store: TokenStore,
    pipeline: RequestPipeline,
    interceptor: ResponseInterceptor,
}

impl SessionContext {
    /// Build the session stack from configuration.
    ///
    /// Restores a previously saved token when the config points at a data
    /// directory, so a restarted client resumes its session.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        let store = match config.data_dir {
            Some(ref dir) => TokenStore::persistent(dir.clone()),
            None => TokenStore::in_memory(),
        };

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let pipeline = RequestPipeline::new(http.clone(), base_url.clone(), store.clone());
        let refresh = RefreshCoordinator::new(
            http,
            &base_url,
            store.clone(),
            Duration::from_secs(config.timeout_secs),
        );
        let interceptor = ResponseInterceptor::new(pipeline.clone(), refresh);

        Ok(Self {
            store,
            pipeline,
            interceptor,
        })
    }

    /// Whether a session token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Exchange credentials for an access token at `POST /token`.
    ///
    /// On success the token is stored and the refresh cookie from the
    /// response lands in the HTTP client's cookie store. A rejection
    /// surfaces as [`ApiError::Unauthorized`] and changes nothing.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::post("/token")
            .form(&[("username", username), ("password", password)]);

        let issued: TokenResponse = self.execute_json(&descriptor).await?;
        self.store.store(issued.access_token);
        info!("Signed in");
        Ok(())
    }

    /// Create an account at `POST /register`. Does not sign in; the
    /// session state is untouched whatever the outcome.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::post("/register")
            .json(json!({ "email": email, "password": password }));

        self.execute(&descriptor).await?;
        Ok(())
    }

    /// Sign out. The server call is best-effort; the local session is
    /// cleared no matter what it returns.
    pub async fn logout(&self) {
        if let Err(e) = self.execute(&RequestDescriptor::post("/logout")).await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.store.clear();
        info!("Signed out");
    }

    /// Send one request through the full pipeline: stamp, dispatch,
    /// classify, and (on a first 401) renew-and-resend.
    pub(crate) async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.pipeline.dispatch(descriptor).await?;
        self.interceptor.handle(descriptor, response).await
    }

    /// `execute` plus JSON body parsing.
    pub(crate) async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        let response = self.execute(descriptor).await?;
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse response from {}: {}",
                descriptor.path(),
                e
            ))
        })
    }
}
