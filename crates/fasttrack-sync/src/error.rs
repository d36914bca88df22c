//! Error types for the synchronization layer.

use fasttrack_engine::RuleViolation;
use fasttrack_events::{EventError, PeerId};

/// Errors from a peer transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No channel exists to that peer.
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// The channel to a peer was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer-id announcement exchange failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}

/// Errors surfaced by the peer node and the sync core.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The rules engine rejected a local operation.
    #[error(transparent)]
    Rules(#[from] RuleViolation),

    /// The event log rejected an event.
    #[error(transparent)]
    Log(#[from] EventError),

    /// A transport operation failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Transport-level payloads (heartbeat, sync request/response) are
    /// produced by the protocol itself and cannot be dispatched.
    #[error("cannot dispatch a transport-level payload")]
    TransportPayload,

    /// The node's actor task is gone.
    #[error("node is shut down")]
    NodeClosed,
}
