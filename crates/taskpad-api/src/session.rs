use std::fs;
use std::io;
use std::path::PathBuf;

use taskpad_core::auth::{AuthState, Session};
use tracing::{debug, warn};

use crate::{ApiError, BlockingClient};

/// Owns the auth state machine and the durable session file.
///
/// The whole session (token + user) is persisted on login and removed on
/// logout. At startup a stored session is restored only after the token is
/// silently validated against the protected task-list endpoint.
pub struct SessionStore {
    state: AuthState,
    file: PathBuf,
}

impl SessionStore {
    pub fn new(file: PathBuf) -> Self {
        Self {
            state: AuthState::new(),
            file,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.state.user().map(|u| u.name.as_str())
    }

    /// Dispatch a login. On success the token is copied onto the client
    /// and the session is persisted.
    pub fn login(
        &mut self,
        api: &mut BlockingClient,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        self.state.login_started();
        match api.login(email, password) {
            Ok(session) => {
                api.set_token(Some(session.token.clone()));
                if let Err(e) = self.persist(&session) {
                    // A session that outlives the process is a convenience,
                    // not a requirement; the login itself still succeeded.
                    warn!("failed to persist session: {e}");
                }
                self.state.login_succeeded(session);
                Ok(())
            }
            Err(e) => {
                api.set_token(None);
                self.state.login_failed();
                Err(e)
            }
        }
    }

    /// Restore a persisted session at startup, validating the stored token
    /// against the task list before settling into logged-in. A missing
    /// file, a rejected token, and a network failure all settle into
    /// logged-out.
    pub fn restore(&mut self, api: &mut BlockingClient) -> bool {
        let Some(session) = self.load() else {
            return false;
        };

        api.set_token(Some(session.token.clone()));
        match api.list_tasks() {
            Ok(_) => {
                debug!("restored session for {}", session.user.email);
                self.state.session_restored(session);
                true
            }
            Err(e) => {
                if e.is_unauthorized() {
                    // Stale token; drop the file so we don't retry it.
                    let _ = fs::remove_file(&self.file);
                } else {
                    warn!("session validation failed: {e}");
                }
                api.set_token(None);
                self.state.logged_out();
                false
            }
        }
    }

    /// Explicit logout: clear the client token, the state, and the file.
    pub fn logout(&mut self, api: &mut BlockingClient) {
        api.set_token(None);
        self.state.logged_out();
        let _ = fs::remove_file(&self.file);
    }

    /// The token was rejected on a protected call.
    pub fn invalidate(&mut self, api: &mut BlockingClient) {
        self.logout(api);
    }

    fn persist(&self, session: &Session) -> io::Result<()> {
        if let Some(dir) = self.file.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.file, json)
    }

    fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.file).ok()?;
        serde_json::from_str(&raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpad_core::user::User;

    fn session() -> Session {
        Session {
            token: "t1".into(),
            user: User {
                id: "u1".into(),
                name: "Ann".into(),
                email: "ann@example.com".into(),
            },
        }
    }

    #[test]
    fn persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session"));
        store.persist(&session()).unwrap();
        assert_eq!(store.load(), Some(session()));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn load_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        fs::write(&path, "not json").unwrap();
        let store = SessionStore::new(path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn persist_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session"));
        store.persist(&session()).unwrap();
        assert!(store.load().is_some());
    }
}
