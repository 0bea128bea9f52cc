//! In-memory stub of the task-manager backend, for integration tests.
//!
//! The real backend is an external service; this stub implements just
//! enough of its contract for the client to be exercised end to end:
//! signup/login with opaque tokens, per-owner task CRUD, `{"msg"}` error
//! bodies, and verbatim `Authorization` header matching (no scheme
//! prefix).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use taskpad_core::task::Task;
use taskpad_core::user::User;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Default)]
struct StubState {
    /// Registered users with their (plaintext, it's a stub) passwords.
    users: Vec<(User, String)>,
    /// token -> user id
    sessions: HashMap<String, String>,
    tasks: Vec<Task>,
    token_seq: u64,
}

type Shared = Arc<Mutex<StubState>>;

/// A running stub server with its base URL and seeding helpers.
pub struct StubServer {
    pub base_url: String,
    state: Shared,
    _handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    /// Register a user directly, without going through the signup endpoint.
    pub fn seed_user(&self, name: &str, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
        };
        let mut state = self.state.lock().unwrap();
        state.users.push((user.clone(), password.to_string()));
        user
    }

    /// Register a user and an already-valid token for them, as if they had
    /// logged in earlier.
    pub fn seed_session(&self, token: &str, name: &str, email: &str) -> User {
        let user = self.seed_user(name, email, "irrelevant");
        let mut state = self.state.lock().unwrap();
        state.sessions.insert(token.to_string(), user.id.clone());
        user
    }

    /// Create a task owned by the given user id.
    pub fn seed_task(&self, owner_id: &str, description: &str) -> Task {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            owner: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.lock().unwrap();
        state.tasks.push(task.clone());
        task
    }

    /// Invalidate a token server-side, as if the session had expired.
    pub fn revoke_session(&self, token: &str) {
        self.state.lock().unwrap().sessions.remove(token);
    }

    /// Snapshot of all tasks currently held by the stub.
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }
}

pub fn build_router(state: Shared) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(state)
}

/// Spawn the stub on a random port. Returns the handle with `base_url`
/// (e.g. "http://127.0.0.1:12345").
pub async fn spawn_stub_server() -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let state: Shared = Arc::new(Mutex::new(StubState::default()));
    let app = build_router(state.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    StubServer {
        base_url,
        state,
        _handle: handle,
    }
}

/// Spawn the stub on its own thread with a dedicated runtime, for tests
/// that drive the blocking client and so cannot run inside a tokio
/// runtime themselves.
pub fn spawn_stub_blocking() -> StubServer {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
        let server = rt.block_on(spawn_stub_server());
        tx.send(server).expect("failed to hand the stub to the test");
        // Keep the runtime alive so the serve task keeps running.
        rt.block_on(std::future::pending::<()>());
    });
    rx.recv().expect("stub server failed to start")
}

type HandlerError = (StatusCode, Json<Value>);

fn err(status: StatusCode, msg: &str) -> HandlerError {
    (status, Json(json!({ "msg": msg })))
}

/// Resolve the verbatim `Authorization` header to a user id.
fn authed(state: &StubState, headers: &HeaderMap) -> Result<String, HandlerError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|token| state.sessions.get(token))
        .cloned()
        .ok_or_else(|| err(StatusCode::UNAUTHORIZED, "Token missing or invalid"))
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
}

async fn signup(
    State(state): State<Shared>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    if body.name.is_empty() || body.email.is_empty() || body.password.is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "Please fill all the fields"));
    }
    let mut state = state.lock().unwrap();
    if state.users.iter().any(|(u, _)| u.email == body.email) {
        return Err(err(
            StatusCode::BAD_REQUEST,
            "This email is already registered",
        ));
    }
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        email: body.email,
    };
    state.users.push((user.clone(), body.password));
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "msg": "Account created, please log in" })),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Shared>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, HandlerError> {
    let mut state = state.lock().unwrap();
    let user = state
        .users
        .iter()
        .find(|(u, pw)| u.email == body.email && *pw == body.password)
        .map(|(u, _)| u.clone())
        .ok_or_else(|| err(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

    state.token_seq += 1;
    let token = format!("t{}", state.token_seq);
    state.sessions.insert(token.clone(), user.id.clone());
    Ok(Json(
        json!({ "token": token, "user": user, "msg": "Login successful" }),
    ))
}

async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, HandlerError> {
    let state = state.lock().unwrap();
    let owner = authed(&state, &headers)?;
    let tasks: Vec<&Task> = state.tasks.iter().filter(|t| t.owner == owner).collect();
    Ok(Json(json!({ "tasks": tasks })))
}

async fn get_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, HandlerError> {
    let state = state.lock().unwrap();
    let owner = authed(&state, &headers)?;
    let task = state
        .tasks
        .iter()
        .find(|t| t.id == id && t.owner == owner)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Task not found"))?;
    Ok(Json(json!({ "task": task })))
}

#[derive(Debug, Deserialize)]
struct TaskBody {
    description: String,
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<TaskBody>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let mut state = state.lock().unwrap();
    let owner = authed(&state, &headers)?;
    if body.description.trim().is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "Description is required"));
    }
    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4().to_string(),
        description: body.description,
        owner,
        created_at: now,
        updated_at: now,
    };
    state.tasks.push(task.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "task": task, "msg": "Task created successfully" })),
    ))
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<TaskBody>,
) -> Result<Json<Value>, HandlerError> {
    let mut state = state.lock().unwrap();
    let owner = authed(&state, &headers)?;
    if body.description.trim().is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "Description is required"));
    }
    let task = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id && t.owner == owner)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Task not found"))?;
    task.description = body.description;
    task.updated_at = Utc::now();
    Ok(Json(json!({ "task": task, "msg": "Task updated successfully" })))
}

async fn delete_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, HandlerError> {
    let mut state = state.lock().unwrap();
    let owner = authed(&state, &headers)?;
    let before = state.tasks.len();
    state.tasks.retain(|t| !(t.id == id && t.owner == owner));
    if state.tasks.len() == before {
        return Err(err(StatusCode::NOT_FOUND, "Task not found"));
    }
    Ok(Json(json!({ "msg": "Task deleted successfully" })))
}
