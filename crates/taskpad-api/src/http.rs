use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use taskpad_core::auth::Session;
use taskpad_core::task::{CreateTask, Task, UpdateTask};
use taskpad_core::user::User;
use tracing::{debug, warn};

use crate::ApiError;

const FALLBACK_ERROR: &str = "Something went wrong, please try again";

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Debug, Deserialize)]
struct TasksEnvelope {
    tasks: Vec<Task>,
}

/// Async HTTP client for the task-manager API.
///
/// The session token, when set, is sent verbatim in the `Authorization`
/// header on every protected call. The API does not use a scheme prefix.
pub struct HttpClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            token: None,
        }
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token);
        client
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", token.as_str()),
            None => builder,
        }
    }

    /// Check if the server is reachable. Any HTTP answer counts; only a
    /// connection failure is an error.
    pub async fn health_check(&self) -> Result<(), ApiError> {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("connection failed: {e}")))?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        debug!("POST /auth/login");
        let resp = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(net_err)?;
        handle_response(resp).await
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        debug!("POST /auth/signup");
        let resp = self
            .client
            .post(format!("{}/auth/signup", self.base_url))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(net_err)?;
        handle_response::<UserEnvelope>(resp).await.map(|e| e.user)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        debug!("GET /tasks");
        let builder = self.client.get(format!("{}/tasks", self.base_url));
        let resp = self.with_auth(builder).send().await.map_err(net_err)?;
        handle_response::<TasksEnvelope>(resp).await.map(|e| e.tasks)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        debug!("GET /tasks/{id}");
        let builder = self.client.get(format!("{}/tasks/{id}", self.base_url));
        let resp = self.with_auth(builder).send().await.map_err(net_err)?;
        handle_response::<TaskEnvelope>(resp).await.map(|e| e.task)
    }

    pub async fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError> {
        debug!("POST /tasks");
        let builder = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .json(input);
        let resp = self.with_auth(builder).send().await.map_err(net_err)?;
        handle_response::<TaskEnvelope>(resp).await.map(|e| e.task)
    }

    pub async fn update_task(&self, id: &str, input: &UpdateTask) -> Result<Task, ApiError> {
        debug!("PUT /tasks/{id}");
        let builder = self
            .client
            .put(format!("{}/tasks/{id}", self.base_url))
            .json(input);
        let resp = self.with_auth(builder).send().await.map_err(net_err)?;
        handle_response::<TaskEnvelope>(resp).await.map(|e| e.task)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        debug!("DELETE /tasks/{id}");
        let builder = self.client.delete(format!("{}/tasks/{id}", self.base_url));
        let resp = self.with_auth(builder).send().await.map_err(net_err)?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

fn net_err(e: reqwest::Error) -> ApiError {
    ApiError::Internal(e.to_string())
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

/// Map an error response to an `ApiError`, carrying the server-provided
/// `msg` field when the body has one and a generic fallback otherwise.
async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ApiError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["msg"].as_str().map(String::from))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                FALLBACK_ERROR.to_string()
            } else {
                body
            }
        });
    warn!("request failed with {status}: {msg}");

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized(msg)
    } else if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ApiError::InvalidInput(msg)
    } else {
        ApiError::Internal(msg)
    }
}
