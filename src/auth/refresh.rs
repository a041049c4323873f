//! Single-flight session renewal.
//!
//! When an access token expires, every in-flight request discovers it at
//! roughly the same time. The [`RefreshCoordinator`] funnels all of them
//! into one renewal call: the first caller owns the episode, everyone else
//! joins it, and a single [`RefreshOutcome`] is broadcast to the lot.
//!
//! The refresh credential itself is an HttpOnly cookie managed by the
//! transport's cookie store; this module never sees it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::api::ApiError;
use super::TokenStore;

/// Result of one renewal episode, delivered to the owner and every joiner.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The server issued a fresh access token; it is already in the store.
    Renewed(String),
    /// The server rejected the renewal or it timed out; the session is
    /// cleared and the user must sign in again.
    Denied,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Coordinates token renewal so that any number of concurrent discoverers
/// of an expired token produce exactly one `/refresh` call.
///
/// The pending slot holds the broadcast sender for the episode in progress.
/// Joining means subscribing to that sender; owning means installing it and
/// running the renewal. The slot is emptied before the outcome is published,
/// so a caller that arrives after publication starts a fresh episode rather
/// than waiting on a finished one.
#[derive(Clone)]
pub struct RefreshCoordinator {
    http: Client,
    refresh_url: String,
    store: TokenStore,
    timeout: Duration,
    pending: Arc<Mutex<Option<broadcast::Sender<RefreshOutcome>>>>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, base_url: &str, store: TokenStore, timeout: Duration) -> Self {
        Self {
            http,
            refresh_url: format!("{}/refresh", base_url),
            store,
            timeout,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Renew the session, sharing the outcome with every concurrent caller.
    ///
    /// At most one renewal call is in flight at a time. The episode runs on
    /// its own task, so cancelling a caller that is merely waiting does not
    /// abort the renewal for everyone else.
    pub async fn refresh(&self) -> RefreshOutcome {
        let mut rx = {
            let mut pending = self.pending.lock().await;
            match *pending {
                Some(ref episode) => {
                    debug!("Joining in-progress session renewal");
                    episode.subscribe()
                }
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    *pending = Some(tx.clone());
                    let owner = self.clone();
                    tokio::spawn(async move {
                        owner.run_episode(tx).await;
                    });
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            // Sender dropped without publishing; only happens if the
            // episode task died, so treat it as a denial.
            Err(_) => RefreshOutcome::Denied,
        }
    }

    async fn run_episode(self, tx: broadcast::Sender<RefreshOutcome>) {
        let outcome = match tokio::time::timeout(self.timeout, self.renew_once()).await {
            Ok(Ok(token)) => {
                self.store.store(token.clone());
                info!("Access token renewed");
                RefreshOutcome::Renewed(token)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Session renewal rejected");
                self.store.clear();
                RefreshOutcome::Denied
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Session renewal timed out");
                self.store.clear();
                RefreshOutcome::Denied
            }
        };

        // Empty the slot before publishing: anyone who finds it empty
        // starts a new episode instead of subscribing to a finished one.
        *self.pending.lock().await = None;
        let _ = tx.send(outcome);
    }

    /// The one renewal call per episode. The refresh cookie rides along
    /// via the client's cookie store; no body is sent.
    async fn renew_once(&self) -> Result<String, ApiError> {
        let response = self.http.post(&self.refresh_url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let refreshed: RefreshResponse = response.json().await?;
        Ok(refreshed.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The full renewal flow (single network call under concurrency, denial
    // clearing the session) is covered against a mock server in
    // tests/auth_pipeline.rs. These tests pin the slot mechanics.

    fn coordinator(store: TokenStore) -> RefreshCoordinator {
        RefreshCoordinator::new(
            Client::new(),
            "http://localhost:8000",
            store,
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_waiters_receive_outcome_published_by_owner() {
        let store = TokenStore::in_memory();
        let coord = coordinator(store.clone());

        // Install an episode by hand and join it.
        let (tx, _rx) = broadcast::channel(1);
        *coord.pending.lock().await = Some(tx.clone());

        let joiner = {
            let coord = coord.clone();
            tokio::spawn(async move { coord.refresh().await })
        };
        tokio::task::yield_now().await;

        *coord.pending.lock().await = None;
        tx.send(RefreshOutcome::Renewed("t2".to_string())).unwrap();

        match joiner.await.unwrap() {
            RefreshOutcome::Renewed(token) => assert_eq!(token, "t2"),
            RefreshOutcome::Denied => panic!("expected renewed outcome"),
        }
    }

    #[tokio::test]
    async fn test_dropped_episode_counts_as_denial() {
        let coord = coordinator(TokenStore::in_memory());

        let (tx, _rx) = broadcast::channel(1);
        *coord.pending.lock().await = Some(tx.clone());

        let joiner = {
            let coord = coord.clone();
            tokio::spawn(async move { coord.refresh().await })
        };
        tokio::task::yield_now().await;

        *coord.pending.lock().await = None;
        drop(tx);

        assert!(matches!(joiner.await.unwrap(), RefreshOutcome::Denied));
    }
}
