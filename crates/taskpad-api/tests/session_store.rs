//! Integration tests for session persistence and startup restore.

use std::fs;
use std::path::PathBuf;

use taskpad_api::test_support::spawn_stub_blocking;
use taskpad_api::{BlockingClient, SessionStore};
use taskpad_core::auth::{Phase, Session};
use taskpad_core::user::User;

fn session_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("session")
}

#[test]
fn login_persists_the_session_and_sets_the_client_token() {
    let server = spawn_stub_blocking();
    server.seed_user("Ann", "ann@example.com", "supersecret");
    let dir = tempfile::tempdir().unwrap();
    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));

    store
        .login(&mut api, "ann@example.com", "supersecret")
        .unwrap();

    assert!(store.is_logged_in());
    assert_eq!(store.user_name(), Some("Ann"));
    assert!(api.token().is_some());

    let raw = fs::read_to_string(session_path(&dir)).unwrap();
    let saved: Session = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved.token, api.token().unwrap());
    assert_eq!(saved.user.email, "ann@example.com");
}

#[test]
fn failed_login_settles_into_logged_out_with_no_file() {
    let server = spawn_stub_blocking();
    server.seed_user("Ann", "ann@example.com", "supersecret");
    let dir = tempfile::tempdir().unwrap();
    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));

    let err = store.login(&mut api, "ann@example.com", "wrong");
    assert!(err.is_err());
    assert_eq!(store.state().phase(), Phase::LoggedOut);
    assert!(api.token().is_none());
    assert!(!session_path(&dir).exists());
}

#[test]
fn restore_round_trips_a_persisted_session() {
    let server = spawn_stub_blocking();
    server.seed_user("Ann", "ann@example.com", "supersecret");
    let dir = tempfile::tempdir().unwrap();

    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));
    store
        .login(&mut api, "ann@example.com", "supersecret")
        .unwrap();

    // A fresh process: new client, new store, same file.
    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));
    assert!(store.restore(&mut api));
    assert!(store.is_logged_in());
    assert_eq!(store.user_name(), Some("Ann"));
    assert!(api.token().is_some());
}

#[test]
fn restore_with_a_stale_token_removes_the_file() {
    let server = spawn_stub_blocking();
    let dir = tempfile::tempdir().unwrap();
    let stale = Session {
        token: "no-longer-valid".into(),
        user: User {
            id: "u1".into(),
            name: "Ann".into(),
            email: "ann@example.com".into(),
        },
    };
    fs::write(
        session_path(&dir),
        serde_json::to_string(&stale).unwrap(),
    )
    .unwrap();

    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));
    assert!(!store.restore(&mut api));
    assert_eq!(store.state().phase(), Phase::LoggedOut);
    assert!(api.token().is_none());
    assert!(!session_path(&dir).exists());
}

#[test]
fn restore_without_a_file_is_a_quiet_no_op() {
    let server = spawn_stub_blocking();
    let dir = tempfile::tempdir().unwrap();
    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));

    assert!(!store.restore(&mut api));
    assert_eq!(store.state().phase(), Phase::LoggedOut);
}

#[test]
fn logout_clears_the_state_token_and_file() {
    let server = spawn_stub_blocking();
    server.seed_user("Ann", "ann@example.com", "supersecret");
    let dir = tempfile::tempdir().unwrap();
    let mut api = BlockingClient::new(&server.base_url);
    let mut store = SessionStore::new(session_path(&dir));
    store
        .login(&mut api, "ann@example.com", "supersecret")
        .unwrap();

    store.logout(&mut api);
    assert_eq!(store.state().phase(), Phase::LoggedOut);
    assert!(api.token().is_none());
    assert!(!session_path(&dir).exists());
}
