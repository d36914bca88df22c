//! The node-level connection state machine.
//!
//! ```text
//!   Disconnected ──→ Connecting ──→ Connected ──→ Disconnected
//!         ↑               │             │
//!         │               └──→ Error ←──┘
//!         └────────────────────┘ (after teardown)
//! ```
//!
//! Observable through a `watch` channel: subscribers always see the
//! latest state and are woken on every transition.

use std::fmt;

use tokio::sync::watch;

/// Where the node stands with its session's mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channels exist.
    Disconnected,
    /// Channels are being established.
    Connecting,
    /// The mesh is up.
    Connected,
    /// A transport failure took the mesh down.
    Error,
}

impl ConnectionState {
    /// Whether `to` is a legal successor of `self`.
    fn can_become(self, to: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, to),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Error)
                | (Connecting, Disconnected)
                | (Connected, Error)
                | (Connected, Disconnected)
                | (Error, Connecting)
                | (Error, Disconnected)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Owner side of the connection machine. Held by the node actor.
pub struct ConnectionTracker {
    tx: watch::Sender<ConnectionState>,
}

impl ConnectionTracker {
    /// Creates a tracker in `Disconnected` plus its subscription handle.
    pub fn new() -> (Self, watch::Receiver<ConnectionState>) {
        let (tx, rx) = watch::channel(ConnectionState::Disconnected);
        (Self { tx }, rx)
    }

    /// The current state.
    pub fn current(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Transitions to `to` if the machine allows it. An illegal
    /// transition is logged and ignored (repeating the current state is
    /// a silent no-op, which makes teardown idempotent).
    pub fn transition(&self, to: ConnectionState) {
        let from = self.current();
        if from == to {
            return;
        }
        if !from.can_become(to) {
            tracing::warn!(%from, %to, "illegal connection transition ignored");
            return;
        }
        tracing::info!(%from, %to, "connection state changed");
        let _ = self.tx.send(to);
    }
}
