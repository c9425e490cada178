//! HTTP client abstraction for the ADS source and roster fetching
//!
//! The pipeline is synchronous; [`block_on`] drives the async reqwest client
//! on a shared current-thread runtime.

pub mod native;

pub use native::*;

use std::future::Future;
use std::sync::OnceLock;

use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("Timeout")]
    Timeout,
    #[error("Rate limited")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {message}")]
    ParseError { message: String },
    #[error("Runtime unavailable: {message}")]
    Runtime { message: String },
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn non-2xx responses into [`HttpError::Status`]
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

fn runtime() -> Result<&'static Runtime, HttpError> {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();

    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| HttpError::Runtime {
            message: e.to_string(),
        })?;
    Ok(RUNTIME.get_or_init(|| runtime))
}

/// Run a future to completion from synchronous code
pub fn block_on<F: Future>(future: F) -> Result<F::Output, HttpError> {
    Ok(runtime()?.block_on(future))
}
