//! Integration tests for the HTTP client against the in-memory stub.

use taskpad_api::test_support::spawn_stub_blocking;
use taskpad_api::{ApiError, BlockingClient};
use taskpad_core::task::{CreateTask, UpdateTask};

#[test]
fn signup_then_login_round_trip() {
    let server = spawn_stub_blocking();
    let api = BlockingClient::new(&server.base_url);

    let user = api
        .signup("Ann Example", "ann@example.com", "supersecret")
        .unwrap();
    assert_eq!(user.name, "Ann Example");
    assert_eq!(user.email, "ann@example.com");

    let session = api.login("ann@example.com", "supersecret").unwrap();
    assert!(!session.token.is_empty());
    assert_eq!(session.user, user);
}

#[test]
fn login_with_wrong_password_is_unauthorized() {
    let server = spawn_stub_blocking();
    server.seed_user("Ann", "ann@example.com", "supersecret");
    let api = BlockingClient::new(&server.base_url);

    let err = api.login("ann@example.com", "wrong").unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(err.message(), "Invalid email or password");
}

#[test]
fn duplicate_signup_email_is_rejected() {
    let server = spawn_stub_blocking();
    server.seed_user("Ann", "ann@example.com", "supersecret");
    let api = BlockingClient::new(&server.base_url);

    let err = api
        .signup("Other Ann", "ann@example.com", "different1")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(err.message(), "This email is already registered");
}

#[test]
fn task_crud_round_trip() {
    let server = spawn_stub_blocking();
    server.seed_session("t1", "Ann", "ann@example.com");
    let api = BlockingClient::with_token(&server.base_url, "t1".into());

    assert!(api.list_tasks().unwrap().is_empty());

    let created = api
        .create_task(&CreateTask {
            description: "water the plants".into(),
        })
        .unwrap();
    assert_eq!(created.description, "water the plants");

    let listed = api.list_tasks().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let fetched = api.get_task(&created.id).unwrap();
    assert_eq!(fetched.description, "water the plants");

    let updated = api
        .update_task(
            &created.id,
            &UpdateTask {
                description: "water the plants daily".into(),
            },
        )
        .unwrap();
    assert_eq!(updated.description, "water the plants daily");

    api.delete_task(&created.id).unwrap();
    assert!(api.list_tasks().unwrap().is_empty());

    let err = api.get_task(&created.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.message(), "Task not found");
}

#[test]
fn token_is_sent_verbatim_without_a_scheme_prefix() {
    let server = spawn_stub_blocking();
    server.seed_session("t1", "Ann", "ann@example.com");

    // The raw token is accepted.
    let api = BlockingClient::with_token(&server.base_url, "t1".into());
    assert!(api.list_tasks().is_ok());

    // A Bearer-prefixed value no longer matches the stored token.
    let api = BlockingClient::with_token(&server.base_url, "Bearer t1".into());
    let err = api.list_tasks().unwrap_err();
    assert!(err.is_unauthorized());
}

#[test]
fn protected_calls_without_a_token_are_unauthorized() {
    let server = spawn_stub_blocking();
    let api = BlockingClient::new(&server.base_url);

    let err = api.list_tasks().unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "Token missing or invalid");
}

#[test]
fn tasks_are_scoped_to_their_owner() {
    let server = spawn_stub_blocking();
    let ann = server.seed_session("t-ann", "Ann", "ann@example.com");
    server.seed_session("t-bob", "Bob", "bob@example.com");
    let theirs = server.seed_task(&ann.id, "ann's task");

    let api = BlockingClient::with_token(&server.base_url, "t-bob".into());
    assert!(api.list_tasks().unwrap().is_empty());

    let err = api.get_task(&theirs.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn health_check_reports_connection_failures() {
    let server = spawn_stub_blocking();
    let api = BlockingClient::new(&server.base_url);
    assert!(api.health_check().is_ok());

    let api = BlockingClient::new("http://127.0.0.1:1");
    assert!(matches!(api.health_check(), Err(ApiError::Internal(_))));
}
