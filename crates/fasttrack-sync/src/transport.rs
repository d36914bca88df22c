//! The peer transport seam.
//!
//! The sync layer talks to the network through this minimal interface
//! (per-peer send, broadcast, inbound frame stream), so the full-mesh
//! topology used today can later be swapped for a relay or star without
//! touching the rules engine or the resync protocol.

use std::future::Future;

use fasttrack_events::PeerId;
use tokio::sync::mpsc;

use crate::TransportError;

/// An inbound frame: who sent it and the raw bytes.
pub type InboundFrame = (PeerId, Vec<u8>);

/// Receiver half of a transport's inbound stream.
pub type InboundReceiver = mpsc::UnboundedReceiver<InboundFrame>;

/// Sender half, used internally by transport implementations.
pub type InboundSender = mpsc::UnboundedSender<InboundFrame>;

/// A connection fabric between one peer and the rest of the session.
///
/// Implementations deliver inbound frames through the
/// [`InboundReceiver`] returned at construction; this trait only covers
/// the outbound half and lifecycle.
///
/// The methods return `Send` futures (rather than being plain
/// `async fn`) because the node actor runs them inside a spawned task
/// and must stay generic over the transport.
pub trait PeerTransport: Send + Sync + 'static {
    /// Sends a frame to one peer.
    fn send(
        &self,
        to: PeerId,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sends a frame to every connected peer.
    fn broadcast(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// The peers a channel currently exists to.
    fn peers(&self) -> impl Future<Output = Vec<PeerId>> + Send;

    /// Tears down every channel. Idempotent.
    fn close(
        &self,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
