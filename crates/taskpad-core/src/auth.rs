use serde::{Deserialize, Serialize};

use crate::user::User;

/// A confirmed session as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Where the auth state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    LoggedOut,
    /// A login request is in flight.
    LoggingIn,
    LoggedIn,
}

/// Centralized authentication state. All mutation goes through the named
/// transition methods; views read snapshots through the accessors.
///
/// Invariant: `token()` is `Some` (non-empty) exactly when the phase is
/// `LoggedIn`.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    phase: Phase,
    token: String,
    user: Option<User>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A login request was dispatched.
    pub fn login_started(&mut self) {
        self.phase = Phase::LoggingIn;
        self.token.clear();
        self.user = None;
    }

    /// The server confirmed credentials. An empty token is treated as a
    /// failed login so the token/phase invariant cannot be broken from
    /// outside.
    pub fn login_succeeded(&mut self, session: Session) {
        if session.token.is_empty() {
            self.login_failed();
            return;
        }
        self.phase = Phase::LoggedIn;
        self.token = session.token;
        self.user = Some(session.user);
    }

    /// The server rejected credentials, or the request failed.
    pub fn login_failed(&mut self) {
        self.phase = Phase::LoggedOut;
        self.token.clear();
        self.user = None;
    }

    /// A stored token was validated at startup.
    pub fn session_restored(&mut self, session: Session) {
        self.login_succeeded(session);
    }

    /// Explicit logout, or the token was found invalid on a protected call.
    pub fn logged_out(&mut self) {
        self.phase = Phase::LoggedOut;
        self.token.clear();
        self.user = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_logged_in(&self) -> bool {
        self.phase == Phase::LoggedIn
    }

    /// True while a login request is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::LoggingIn
    }

    pub fn token(&self) -> Option<&str> {
        if self.token.is_empty() {
            None
        } else {
            Some(&self.token)
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> Session {
        Session {
            token: "t1".into(),
            user: User {
                id: "u1".into(),
                name: "Ann".into(),
                email: "ann@example.com".into(),
            },
        }
    }

    fn invariant_holds(state: &AuthState) -> bool {
        state.is_logged_in() == state.token().is_some()
    }

    #[test]
    fn starts_logged_out() {
        let state = AuthState::new();
        assert_eq!(state.phase(), Phase::LoggedOut);
        assert!(!state.is_logged_in());
        assert!(state.token().is_none());
        assert!(state.user().is_none());
    }

    #[test]
    fn login_happy_path() {
        let mut state = AuthState::new();
        state.login_started();
        assert!(state.is_loading());
        assert!(invariant_holds(&state));

        state.login_succeeded(ann());
        assert!(state.is_logged_in());
        assert_eq!(state.token(), Some("t1"));
        assert_eq!(state.user().unwrap().name, "Ann");
        assert!(invariant_holds(&state));
    }

    #[test]
    fn login_rejection_clears_everything() {
        let mut state = AuthState::new();
        state.login_started();
        state.login_failed();
        assert_eq!(state.phase(), Phase::LoggedOut);
        assert!(state.token().is_none());
        assert!(state.user().is_none());
        assert!(invariant_holds(&state));
    }

    #[test]
    fn logout_from_logged_in() {
        let mut state = AuthState::new();
        state.login_started();
        state.login_succeeded(ann());
        state.logged_out();
        assert!(!state.is_logged_in());
        assert!(state.token().is_none());
        assert!(invariant_holds(&state));
    }

    #[test]
    fn restore_behaves_like_login() {
        let mut state = AuthState::new();
        state.session_restored(ann());
        assert!(state.is_logged_in());
        assert_eq!(state.token(), Some("t1"));
        assert!(invariant_holds(&state));
    }

    #[test]
    fn empty_token_cannot_reach_logged_in() {
        let mut state = AuthState::new();
        state.login_started();
        state.login_succeeded(Session {
            token: String::new(),
            user: ann().user,
        });
        assert!(!state.is_logged_in());
        assert!(invariant_holds(&state));
    }

    /// Walk every transition from every reachable state and check the
    /// token/phase invariant after each step.
    #[test]
    fn invariant_across_all_reachable_states() {
        let transitions: Vec<fn(&mut AuthState)> = vec![
            |s| s.login_started(),
            |s| s.login_succeeded(ann()),
            |s| s.login_failed(),
            |s| s.session_restored(ann()),
            |s| s.logged_out(),
        ];

        // Depth-3 walk covers every pair and triple of transitions.
        for a in &transitions {
            for b in &transitions {
                for c in &transitions {
                    let mut state = AuthState::new();
                    a(&mut state);
                    assert!(invariant_holds(&state));
                    b(&mut state);
                    assert!(invariant_holds(&state));
                    c(&mut state);
                    assert!(invariant_holds(&state));
                }
            }
        }
    }
}
