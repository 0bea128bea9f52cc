mod blocking;
mod dispatch;
mod error;
mod http;
mod session;

pub use blocking::BlockingClient;
pub use dispatch::{Dispatch, Level, Notice};
pub use error::ApiError;
pub use http::HttpClient;
pub use session::SessionStore;

#[cfg(feature = "test-support")]
pub mod test_support;
