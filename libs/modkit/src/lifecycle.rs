use std::sync::Arc;
use tokio::sync::watch;

/// Server lifecycle phases. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    Starting,
    Listening,
    Draining,
    Stopped,
}

impl ServerState {
    pub const fn as_str(self) -> &'static str {
        match self {
            ServerState::Starting => "starting",
            ServerState::Listening => "listening",
            ServerState::Draining => "draining",
            ServerState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, observable server state.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Debug, Clone)]
pub struct ServerStatus {
    tx: Arc<watch::Sender<ServerState>>,
}

impl Default for ServerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerStatus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ServerState::Starting);
        Self { tx: Arc::new(tx) }
    }

    #[inline]
    pub fn current(&self) -> ServerState {
        *self.tx.borrow()
    }

    /// Move to `next`. Returns `false` (and leaves the state alone) for
    /// backward or repeated transitions.
    pub fn advance(&self, next: ServerState) -> bool {
        let mut prev = None;
        let changed = self.tx.send_if_modified(|cur| {
            if next > *cur {
                prev = Some(*cur);
                *cur = next;
                true
            } else {
                false
            }
        });
        if let Some(from) = prev {
            tracing::info!(from = %from, to = %next, "server state changed");
        }
        changed
    }
}
