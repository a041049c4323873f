use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Token file name in the data directory
const TOKEN_FILE: &str = "token.json";

/// On-disk shape of a saved access token.
///
/// `saved_at` is informational; tokens are never aged out locally.
/// A stale token simply draws a 401 and gets renewed on the next call.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    saved_at: DateTime<Utc>,
}

/// Shared holder for the current access token.
///
/// The token is a single replaceable value: `store` overwrites whatever
/// was there, `clear` empties the slot, and readers see the latest write.
/// All operations are infallible; disk persistence is best-effort and a
/// failed write only degrades the store to in-memory for that token.
///
/// Clones share the same slot.
#[derive(Clone)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Store backed by `token.json` in the given directory.
    ///
    /// A token saved by a previous run is picked up immediately, so a
    /// restarted client resumes its session without signing in again.
    pub fn persistent(data_dir: PathBuf) -> Self {
        let path = data_dir.join(TOKEN_FILE);
        let token = match read_token_file(&path) {
            Ok(Some(stored)) => {
                debug!("Restored access token saved at {}", stored.saved_at);
                Some(stored.access_token)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring unreadable token file {}: {e:#}", path.display());
                None
            }
        };
        Self {
            token: Arc::new(RwLock::new(token)),
            path: Some(path),
        }
    }

    /// Store with no on-disk backing; tokens live for the process only.
    pub fn in_memory() -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            path: None,
        }
    }

    /// The current access token, if one is held.
    pub fn current(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Whether a token is currently held. Token presence is the only
    /// signal of an active session; validity is the server's call.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    /// Replace the held token. Concurrent writers race benignly; the
    /// last write wins and readers never observe a partial value.
    pub fn store(&self, token: String) {
        *self.token.write() = Some(token.clone());
        if let Some(ref path) = self.path {
            if let Err(e) = write_token_file(path, &token) {
                warn!("Failed to persist token to {}: {e:#}", path.display());
            }
        }
    }

    /// Drop the held token and remove the on-disk copy.
    pub fn clear(&self) {
        *self.token.write() = None;
        if let Some(ref path) = self.path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove token file {}: {e}", path.display());
                }
            }
        }
    }
}

fn read_token_file(path: &Path) -> Result<Option<StoredToken>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).context("Failed to read token file")?;
    let stored: StoredToken =
        serde_json::from_str(&contents).context("Failed to parse token file")?;
    Ok(Some(stored))
}

fn write_token_file(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let stored = StoredToken {
        access_token: token.to_string(),
        saved_at: Utc::now(),
    };
    let contents = serde_json::to_string_pretty(&stored)?;
    std::fs::write(path, contents)?;
    Ok(())
}
