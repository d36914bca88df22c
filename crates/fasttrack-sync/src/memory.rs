//! In-process full-mesh transport.
//!
//! Every endpoint holds a channel to every other endpoint. Used by the
//! demo and by tests; also the reference for what a real transport owes
//! the node (ordered, reliable frames tagged with the sender).

use std::collections::HashMap;
use std::sync::Arc;

use fasttrack_events::PeerId;
use tokio::sync::Mutex;

use crate::{
    InboundReceiver, InboundSender, PeerTransport, TransportError,
};

/// One endpoint of an in-memory mesh.
pub struct MemoryEndpoint {
    id: PeerId,
    links: Arc<Mutex<HashMap<PeerId, InboundSender>>>,
}

/// Builds a fully connected mesh over the given peer ids.
///
/// Returns one `(endpoint, inbound)` pair per peer, in input order.
pub fn memory_mesh(
    ids: &[PeerId],
) -> Vec<(MemoryEndpoint, InboundReceiver)> {
    let mut senders = HashMap::new();
    let mut receivers = Vec::new();
    for &id in ids {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        senders.insert(id, tx);
        receivers.push((id, rx));
    }

    receivers
        .into_iter()
        .map(|(id, rx)| {
            // Everyone else's inbound sender, keyed by their peer id.
            let links: HashMap<PeerId, InboundSender> = senders
                .iter()
                .filter(|&(&other, _)| other != id)
                .map(|(&other, tx)| (other, tx.clone()))
                .collect();
            (
                MemoryEndpoint {
                    id,
                    links: Arc::new(Mutex::new(links)),
                },
                rx,
            )
        })
        .collect()
}

impl PeerTransport for MemoryEndpoint {
    async fn send(
        &self,
        to: PeerId,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let links = self.links.lock().await;
        let tx = links
            .get(&to)
            .ok_or(TransportError::UnknownPeer(to))?;
        tx.send((self.id, data.to_vec())).map_err(|_| {
            TransportError::ConnectionClosed(to.to_string())
        })
    }

    async fn broadcast(&self, data: &[u8]) -> Result<(), TransportError> {
        let links = self.links.lock().await;
        for (peer, tx) in links.iter() {
            // A dropped receiver just means that peer is gone; keep
            // delivering to the rest.
            if tx.send((self.id, data.to_vec())).is_err() {
                tracing::debug!(%peer, "dropping frame for closed peer");
            }
        }
        Ok(())
    }

    async fn peers(&self) -> Vec<PeerId> {
        let links = self.links.lock().await;
        let mut peers: Vec<PeerId> = links.keys().copied().collect();
        peers.sort();
        peers
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.links.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_reaches_only_the_addressee() {
        let ids = [PeerId(1), PeerId(2), PeerId(3)];
        let mut mesh = memory_mesh(&ids);
        let (c, mut c_rx) = mesh.pop().unwrap();
        let (_b, mut b_rx) = mesh.pop().unwrap();
        let (a, _a_rx) = mesh.pop().unwrap();
        drop(c);

        a.send(PeerId(2), b"hello").await.unwrap();
        let (from, data) = b_rx.recv().await.unwrap();
        assert_eq!(from, PeerId(1));
        assert_eq!(data, b"hello");
        assert!(c_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone_else() {
        let ids = [PeerId(1), PeerId(2), PeerId(3)];
        let mut mesh = memory_mesh(&ids);
        let (_c, mut c_rx) = mesh.pop().unwrap();
        let (_b, mut b_rx) = mesh.pop().unwrap();
        let (a, mut a_rx) = mesh.pop().unwrap();

        a.broadcast(b"all").await.unwrap();
        assert_eq!(b_rx.recv().await.unwrap().1, b"all");
        assert_eq!(c_rx.recv().await.unwrap().1, b"all");
        assert!(a_rx.try_recv().is_err(), "no self-delivery");
    }

    #[tokio::test]
    async fn test_send_to_unknown_peer_fails() {
        let mut mesh = memory_mesh(&[PeerId(1), PeerId(2)]);
        let (a, _a_rx) = mesh.remove(0);
        assert!(matches!(
            a.send(PeerId(99), b"x").await,
            Err(TransportError::UnknownPeer(_))
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_drops_links() {
        let mut mesh = memory_mesh(&[PeerId(1), PeerId(2)]);
        let (a, _a_rx) = mesh.remove(0);
        a.close().await.unwrap();
        a.close().await.unwrap();
        assert!(a.peers().await.is_empty());
        assert!(matches!(
            a.send(PeerId(2), b"x").await,
            Err(TransportError::UnknownPeer(_))
        ));
    }
}
