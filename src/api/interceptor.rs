//! Inbound response classification.
//!
//! Every response comes through [`ResponseInterceptor::handle`], which
//! either passes it along, or - on the first 401 for a normal endpoint -
//! renews the session and resends the request exactly once. A second 401
//! is terminal for that request; a failed renewal is terminal for the
//! whole session.

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::auth::{RefreshCoordinator, RefreshOutcome};
use super::error::ApiError;
use super::request::{RequestDescriptor, RequestPipeline};

/// Endpoints whose 401 means "bad credentials", not "expired token".
/// Renewing on those would loop: the renewal endpoint rejecting its own
/// cookie must surface as-is, and a failed sign-in is just a failed
/// sign-in.
fn auth_exempt(path: &str) -> bool {
    path == "/token" || path == "/refresh"
}

/// Inbound stage paired with [`RequestPipeline`].
#[derive(Clone)]
pub struct ResponseInterceptor {
    pipeline: RequestPipeline,
    refresh: RefreshCoordinator,
}

impl ResponseInterceptor {
    pub fn new(pipeline: RequestPipeline, refresh: RefreshCoordinator) -> Self {
        Self { pipeline, refresh }
    }

    /// Classify a response for the given request.
    ///
    /// Non-401 responses and 401s from auth-exempt endpoints map straight
    /// to their result. A first 401 elsewhere triggers one session renewal
    /// and one resend; whatever the resend returns is final.
    pub async fn handle(
        &self,
        descriptor: &RequestDescriptor,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        if response.status() != StatusCode::UNAUTHORIZED || auth_exempt(descriptor.path()) {
            return Self::check(response).await;
        }

        if descriptor.retried() {
            warn!(path = descriptor.path(), "Renewed token rejected, giving up");
            return Err(ApiError::AuthExhausted);
        }

        debug!(path = descriptor.path(), "Access token expired, renewing session");
        match self.refresh.refresh().await {
            RefreshOutcome::Renewed(_) => {
                let resend = descriptor.retry();
                let response = self.pipeline.dispatch(&resend).await?;
                if response.status() == StatusCode::UNAUTHORIZED {
                    warn!(path = resend.path(), "Renewed token rejected, giving up");
                    return Err(ApiError::AuthExhausted);
                }
                Self::check(response).await
            }
            RefreshOutcome::Denied => Err(ApiError::AuthDenied),
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // End-to-end retry behavior is exercised against a mock server in
    // tests/auth_pipeline.rs.

    #[test]
    fn test_auth_exempt_exact_paths_only() {
        assert!(auth_exempt("/token"));
        assert!(auth_exempt("/refresh"));
        assert!(!auth_exempt("/market/stocks"));
        assert!(!auth_exempt("/token-stats"));
        assert!(!auth_exempt("/portfolio/refresh"));
    }
}
