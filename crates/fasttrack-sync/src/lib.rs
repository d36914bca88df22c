//! Peer-to-peer state synchronization for FastTrack.
//!
//! Wraps the deterministic reducer with a gossip protocol over direct
//! peer channels:
//!
//! - **Transport seam** ([`PeerTransport`], [`memory_mesh`],
//!   [`WsMesh`]): per-peer send, broadcast, and an inbound frame
//!   stream; the full mesh used today is replaceable behind this trait.
//! - **Protocol core** ([`SyncCore`], [`SyncAction`]): pure
//!   dispatch/ingest/resync/liveness logic, no I/O.
//! - **Peer node** ([`spawn_node`], [`NodeHandle`]): the actor that
//!   ties a core to a transport, plus the host-facing API.
//! - **Connection machine** ([`ConnectionState`]): disconnected to
//!   connecting → connected → (error | disconnected), observable by
//!   subscription.
//! - **Signaling shapes** ([`SignalMessage`]): the bootstrap messages
//!   consumed from the external relay (never reimplemented here; the
//!   relay never carries game events).
//!
//! # Consistency and trust
//!
//! Optimistic local application, gap detection by sequence, and
//! request/response resync; divergence is detected by hash comparison
//! and reported, not silently healed. Peers are assumed cooperative:
//! there is no defense against fabricated or replayed events, and that
//! boundary is documented rather than patched over.

mod connection;
mod core;
mod error;
mod memory;
mod node;
mod signaling;
mod transport;
#[cfg(feature = "websocket")]
mod ws;

pub use connection::{ConnectionState, ConnectionTracker};
pub use core::{SyncAction, SyncConfig, SyncCore};
pub use error::{SyncError, TransportError};
pub use memory::{MemoryEndpoint, memory_mesh};
pub use node::{NodeHandle, spawn_node};
pub use signaling::{SessionId, SignalMessage};
pub use transport::{
    InboundFrame, InboundReceiver, InboundSender, PeerTransport,
};
#[cfg(feature = "websocket")]
pub use ws::WsMesh;
