//! Durable access/refresh token storage.
//!
//! Tokens live in `<state dir>/tokens.json` with restricted permissions
//! (0600). The pair is written and removed as a unit; there is no state with
//! only one of the two tokens on disk. Token values are never logged.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use crate::error::ApiError;
use crate::models::TokenPair;
use crate::storage;

/// Token file name inside the state directory.
const TOKENS_FILE: &str = "tokens.json";

/// On-disk token pair with an in-memory cache.
///
/// The cache is refreshed from every successful `save` and dropped on
/// `clear`, so readers never hit the filesystem after `open`.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    cached: RwLock<Option<TokenPair>>,
}

impl TokenStore {
    /// Opens the store under the given state directory, loading any persisted
    /// pair. A missing, unreadable, or malformed file means no tokens.
    pub fn open(state_dir: &Path) -> Self {
        let path = state_dir.join(TOKENS_FILE);
        let cached = storage::read_json(&path);
        TokenStore {
            path,
            cached: RwLock::new(cached),
        }
    }

    /// Persists both tokens atomically. The in-memory pair is only replaced
    /// once the file is safely on disk, so a failed save leaves the previous
    /// pair in effect.
    pub fn save(&self, access_token: &str, refresh_token: &str) -> Result<(), ApiError> {
        let pair = TokenPair {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        };
        storage::write_json_private(&self.path, &pair).map_err(|source| ApiError::Storage {
            path: self.path.clone(),
            source,
        })?;
        *self.write_cache() = Some(pair);
        Ok(())
    }

    /// The stored access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.read_cache().as_ref().map(|p| p.access_token.clone())
    }

    /// The stored refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.read_cache().as_ref().map(|p| p.refresh_token.clone())
    }

    /// The stored pair, if any.
    pub fn pair(&self) -> Option<TokenPair> {
        self.read_cache().clone()
    }

    /// Removes both tokens. Best effort: a failure to delete the file is
    /// logged and the in-memory pair is dropped regardless.
    pub fn clear(&self) {
        *self.write_cache() = None;
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("cannot remove token file {}: {e}", self.path.display());
            }
        }
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Option<TokenPair>> {
        self.cached.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Option<TokenPair>> {
        self.cached.write().unwrap_or_else(PoisonError::into_inner)
    }
}
