//! Per-request execution context.
//!
//! Every operation downstream of a handler receives a [`RequestCtx`]. It carries a
//! cancellation token (a child of the server's force-stop token) and an optional
//! deadline. Long-running work is wrapped with [`RequestCtx::run`] so it stops as
//! soon as either fires.

use std::{convert::Infallible, future::Future, time::Duration};

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a guarded future did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("request cancelled")]
    Cancelled,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct RequestCtx {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestCtx {
    pub fn new(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// Context with no deadline and a token nobody else holds. For tests and tooling.
    pub fn background() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `fut` until it completes, the token fires, or the deadline passes.
    ///
    /// Cancellation wins over the deadline, and both win over a future that becomes
    /// ready in the same poll.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

/// Server-side factory for [`RequestCtx`]; installed on the router as an extension.
#[derive(Debug, Clone)]
pub struct RequestScope {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl RequestScope {
    pub fn new(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self { cancel, timeout }
    }

    /// A fresh context whose token is a child of the scope token.
    pub fn ctx(&self) -> RequestCtx {
        RequestCtx::new(self.cancel.child_token(), self.timeout)
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new(CancellationToken::new(), Some(DEFAULT_REQUEST_TIMEOUT))
    }
}

impl<S> FromRequestParts<S> for RequestCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = match parts.extensions.get::<RequestScope>() {
            Some(scope) => scope.ctx(),
            None => RequestScope::default().ctx(),
        };
        Ok(ctx)
    }
}
