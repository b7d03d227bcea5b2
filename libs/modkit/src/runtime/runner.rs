//! HTTP server runner.
//!
//! Binds the listener, serves the router until shutdown is requested, then drains
//! in-flight requests under a hard deadline. Two tokens drive this:
//! - `drain`: fired by the shutdown source; stops accepting new connections.
//! - `force`: parent of every request's [`RequestCtx`](crate::RequestCtx); fired
//!   only when the drain deadline passes.

use crate::context::{RequestScope, DEFAULT_REQUEST_TIMEOUT};
use crate::lifecycle::{ServerState, ServerStatus};
use crate::runtime::shutdown;
use anyhow::Context;
use axum::{Extension, Router};
use std::{future::Future, net::SocketAddr, pin::Pin, time::Duration};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Default upper bound for draining in-flight requests.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` triggers the drain.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we start draining.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub enum Listener {
    Addr(SocketAddr),
    /// Already bound; lets callers learn an ephemeral port before serving.
    Bound(TcpListener),
}

pub struct RunOptions {
    pub listener: Listener,
    pub router: Router,
    pub shutdown: ShutdownOptions,
    pub drain_timeout: Duration,
    pub request_timeout: Duration,
    pub status: ServerStatus,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            listener: Listener::Addr(SocketAddr::from(([0, 0, 0, 0], 8080))),
            router: Router::new(),
            shutdown: ShutdownOptions::Signals,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            status: ServerStatus::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every in-flight request finished before the drain deadline.
    Clean,
    /// The drain deadline passed; remaining requests were cancelled.
    Forced,
}

fn spawn_shutdown_waiter(shutdown: ShutdownOptions, drain: CancellationToken) {
    match shutdown {
        ShutdownOptions::Signals => {
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(
                        error = %e,
                        "shutdown: primary waiter failed; falling back to ctrl_c()"
                    );
                    let _ = tokio::signal::ctrl_c().await;
                }
                drain.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                drain.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::debug!("shutdown: external token will control lifecycle");
        }
    }
}

/// Serve until shutdown, then drain.
///
/// Leaves `status` at `Draining`; the caller releases its own resources and then
/// advances to `Stopped`.
pub async fn run(opts: RunOptions) -> anyhow::Result<RunOutcome> {
    let RunOptions {
        listener,
        router,
        shutdown,
        drain_timeout,
        request_timeout,
        status,
    } = opts;

    let drain = match &shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };
    spawn_shutdown_waiter(shutdown, drain.clone());

    let listener = match listener {
        Listener::Addr(addr) => TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?,
        Listener::Bound(l) => l,
    };
    let local_addr = listener.local_addr()?;

    let force = CancellationToken::new();
    let app = router.layer(Extension(RequestScope::new(
        force.clone(),
        Some(request_timeout),
    )));

    let graceful = drain.clone().cancelled_owned();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await
    });

    status.advance(ServerState::Listening);
    tracing::info!(addr = %local_addr, "HTTP server listening");

    tokio::select! {
        biased;
        _ = drain.cancelled() => {}
        res = &mut server => {
            res.context("server task failed")?
                .context("server terminated with error")?;
            anyhow::bail!("server stopped without a shutdown request");
        }
    }

    status.advance(ServerState::Draining);
    tracing::info!(timeout = ?drain_timeout, "draining in-flight requests");

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(res) => {
            res.context("server task failed")?
                .context("server terminated with error")?;
            tracing::info!("drain complete");
            Ok(RunOutcome::Clean)
        }
        Err(_) => {
            tracing::warn!(
                timeout = ?drain_timeout,
                "drain deadline exceeded; cancelling in-flight requests"
            );
            force.cancel();
            server.abort();
            let _ = server.await;
            Ok(RunOutcome::Forced)
        }
    }
}
