//! # ModKit - service plumbing
//!
//! Shared building blocks for HTTP services in this workspace:
//!
//! - **Problem details**: RFC 9457 error bodies for axum handlers
//! - **Request context**: per-request cancellation + deadline threaded through every call
//! - **Lifecycle**: the `Starting → Listening → Draining → Stopped` server state machine
//! - **Runtime**: bind, serve concurrently, drain on shutdown under a hard deadline
//!
//! ## Example
//!
//! ```rust,ignore
//! use modkit::runtime::{run, Listener, RunOptions, ShutdownOptions};
//!
//! let outcome = run(RunOptions {
//!     listener: Listener::Addr("0.0.0.0:8080".parse()?),
//!     router,
//!     shutdown: ShutdownOptions::Signals,
//!     ..RunOptions::default()
//! })
//! .await?;
//! ```

pub use anyhow::Result;

pub mod api;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod runtime;

pub use api::problem::{FieldError, Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use context::{Interrupted, RequestCtx, RequestScope};
pub use lifecycle::{ServerState, ServerStatus};
pub use runtime::{run, Listener, RunOptions, RunOutcome, ShutdownOptions};
