//! In-memory session state with persistence and change notification.
//!
//! The session is the caller-facing view of "who is signed in": the current
//! token pair, the account, and an explicit `is_authenticated` flag. The flag
//! is only raised by a completed sign-in, never inferred from the presence of
//! tokens, so a half-finished sign-in (tokens saved, user fetch failed) is
//! visibly not authenticated.
//!
//! Observers subscribe through a watch channel and always see the latest
//! snapshot. Every change is mirrored to `<state dir>/session.json` so the
//! session survives process restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use crate::models::UserInfo;
use crate::storage;

/// Session file name inside the state directory.
const SESSION_FILE: &str = "session.json";

/// A snapshot of the session at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Shared session state. Cheap to clone snapshots out of, safe to mutate from
/// concurrent tasks; every mutation notifies subscribers and is persisted.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Opens the store under the given state directory, restoring any
    /// persisted session. A missing or malformed file starts signed out.
    pub fn open(state_dir: &Path) -> Self {
        let path = state_dir.join(SESSION_FILE);
        let initial: Session = storage::read_json(&path).unwrap_or_default();
        let (tx, _) = watch::channel(initial);
        SessionStore { path, tx }
    }

    /// Records a completed sign-in: both tokens, the account, and the
    /// authenticated flag in one transition.
    pub fn login(&self, access_token: &str, refresh_token: &str, user: UserInfo) {
        self.mutate(|s| {
            s.access_token = Some(access_token.to_string());
            s.refresh_token = Some(refresh_token.to_string());
            s.user = Some(user);
            s.is_authenticated = true;
        });
    }

    /// Resets to the signed-out state. Idempotent.
    pub fn logout(&self) {
        self.mutate(|s| *s = Session::default());
    }

    /// Replaces the account snapshot, e.g. after re-fetching `/auth/me`.
    /// The authenticated flag is left as is.
    pub fn set_user(&self, user: UserInfo) {
        self.mutate(|s| s.user = Some(user));
    }

    /// Replaces only the access token, used after a silent refresh.
    pub fn update_access_token(&self, access_token: &str) {
        self.mutate(|s| s.access_token = Some(access_token.to_string()));
    }

    /// The current snapshot.
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Whether a sign-in has completed and not been torn down.
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated
    }

    /// Subscribes to session changes. The receiver starts at the current
    /// snapshot and sees every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        self.tx.send_modify(f);
        let snapshot = self.tx.borrow().clone();
        if let Err(e) = storage::write_json_private(&self.path, &snapshot) {
            warn!("cannot persist session to {}: {e}", self.path.display());
        }
    }
}
