use taskpad_core::auth::Session;
use taskpad_core::task::{CreateTask, Task, UpdateTask};
use taskpad_core::user::User;
use tokio::runtime::Runtime;

use crate::{ApiError, HttpClient};

/// Blocking wrapper around the async `HttpClient`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingClient {
    inner: HttpClient,
    rt: Runtime,
}

impl BlockingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: HttpClient::new(base_url),
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        Self {
            inner: HttpClient::with_token(base_url, token),
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.inner.set_token(token);
    }

    pub fn token(&self) -> Option<&str> {
        self.inner.token()
    }

    pub fn health_check(&self) -> Result<(), ApiError> {
        self.rt.block_on(self.inner.health_check())
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        self.rt.block_on(self.inner.login(email, password))
    }

    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, ApiError> {
        self.rt.block_on(self.inner.signup(name, email, password))
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.rt.block_on(self.inner.list_tasks())
    }

    pub fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        self.rt.block_on(self.inner.get_task(id))
    }

    pub fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError> {
        self.rt.block_on(self.inner.create_task(input))
    }

    pub fn update_task(&self, id: &str, input: &UpdateTask) -> Result<Task, ApiError> {
        self.rt.block_on(self.inner.update_task(id, input))
    }

    pub fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.rt.block_on(self.inner.delete_task(id))
    }
}
