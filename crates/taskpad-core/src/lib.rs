pub mod auth;
pub mod route;
pub mod task;
pub mod user;
pub mod validate;

pub use auth::{AuthState, Session};
pub use route::Route;
pub use task::Task;
pub use user::User;
