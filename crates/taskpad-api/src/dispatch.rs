//! Request dispatch bookkeeping for the UI: a `loading` flag that is true
//! for the duration of a call, and a transient notice surfaced when the
//! call settles.

use crate::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A transient notification shown after a request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Dispatch {
    loading: bool,
    notice: Option<Notice>,
}

impl Dispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Run one request. `success` is the notice text to show when the call
    /// succeeds; pass `None` to suppress the success notice (list and
    /// detail fetches). A failed call always produces an error notice
    /// carrying the server-provided message. A dispatch while another is
    /// in flight is rejected.
    pub fn run<T>(
        &mut self,
        success: Option<&str>,
        f: impl FnOnce() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        if self.loading {
            return Err(ApiError::Internal("a request is already in flight".into()));
        }
        self.loading = true;
        let result = f();
        self.loading = false;

        match &result {
            Ok(_) => {
                if let Some(text) = success {
                    self.notice = Some(Notice::success(text));
                }
            }
            Err(e) => self.notice = Some(Notice::error(e.message())),
        }
        result
    }
}
