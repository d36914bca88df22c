//! WebSocket mesh transport using `tokio-tungstenite`.
//!
//! Each peer pair holds one direct WebSocket link (at most 15 links for
//! six peers). Who dials whom is decided during signaling; this module
//! only needs an address to bind and urls to dial. The first frame on a
//! fresh link is a peer-id announcement in each direction; game frames
//! follow as binary messages.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use fasttrack_events::PeerId;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::{InboundReceiver, InboundSender, PeerTransport, TransportError};

type WsError = tokio_tungstenite::tungstenite::Error;
type BoxSink = Pin<Box<dyn Sink<Message, Error = WsError> + Send>>;

/// The first frame on every fresh link, in both directions.
#[derive(Debug, Serialize, Deserialize)]
struct Announce {
    peer: PeerId,
}

fn announce_frame(peer: PeerId) -> Message {
    Message::Text(
        serde_json::to_string(&Announce { peer })
            .expect("announce serializes")
            .into(),
    )
}

fn broken_pipe(e: WsError) -> TransportError {
    TransportError::SendFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        e,
    ))
}

/// A WebSocket-backed [`PeerTransport`].
///
/// Cheap to clone; all clones share the same link table and inbound
/// stream.
#[derive(Clone)]
pub struct WsMesh {
    id: PeerId,
    links: Arc<Mutex<HashMap<PeerId, BoxSink>>>,
    inbound: InboundSender,
    local_addr: std::net::SocketAddr,
    accept_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl WsMesh {
    /// Binds a listener and starts accepting peer links.
    ///
    /// # Errors
    /// [`TransportError::AcceptFailed`] if the address cannot be bound.
    pub async fn bind(
        id: PeerId,
        addr: &str,
    ) -> Result<(Self, InboundReceiver), TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        let local_addr = listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)?;
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let mesh = Self {
            id,
            links: Arc::new(Mutex::new(HashMap::new())),
            inbound: tx,
            local_addr,
            accept_task: Arc::new(Mutex::new(None)),
        };

        let accepting = mesh.clone();
        let task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        tracing::debug!(%addr, "incoming peer link");
                        let mesh = accepting.clone();
                        tokio::spawn(async move {
                            if let Err(error) =
                                mesh.accept_link(stream).await
                            {
                                tracing::warn!(
                                    %error,
                                    "peer link handshake failed"
                                );
                            }
                        });
                    }
                    Err(error) => {
                        tracing::error!(%error, "accept failed");
                        break;
                    }
                }
            }
        });
        *mesh.accept_task.lock().await = Some(task);

        tracing::info!(peer = %id, %local_addr, "WebSocket mesh listening");
        Ok((mesh, rx))
    }

    /// The bound listen address (useful with port 0 in tests).
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Dials a peer's listener and performs the announce exchange.
    /// Returns the remote's announced peer id.
    ///
    /// # Errors
    /// [`TransportError::Handshake`] if the dial or announce fails.
    pub async fn connect(
        &self,
        url: &str,
    ) -> Result<PeerId, TransportError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();
        sink.send(announce_frame(self.id))
            .await
            .map_err(broken_pipe)?;
        let remote = read_announce(&mut stream).await?;
        self.register(remote, Box::pin(sink), stream).await;
        Ok(remote)
    }

    async fn accept_link(
        &self,
        stream: TcpStream,
    ) -> Result<(), TransportError> {
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();
        let remote = read_announce(&mut stream).await?;
        sink.send(announce_frame(self.id))
            .await
            .map_err(broken_pipe)?;
        self.register(remote, Box::pin(sink), stream).await;
        Ok(())
    }

    /// Stores the write half and spawns the reader pump for a link.
    async fn register<S>(&self, remote: PeerId, sink: BoxSink, stream: S)
    where
        S: Stream<Item = Result<Message, WsError>>
            + Send
            + Unpin
            + 'static,
    {
        self.links.lock().await.insert(remote, sink);
        tracing::info!(local = %self.id, %remote, "peer link up");
        tokio::spawn(pump(
            remote,
            stream,
            self.inbound.clone(),
            Arc::clone(&self.links),
        ));
    }
}

/// Reads one announce frame off a fresh link.
async fn read_announce<S>(stream: &mut S) -> Result<PeerId, TransportError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    match stream.next().await {
        Some(Ok(msg)) => {
            let data = msg.into_data();
            let announce: Announce = serde_json::from_slice(&data)
                .map_err(|e| {
                    TransportError::Handshake(e.to_string())
                })?;
            Ok(announce.peer)
        }
        Some(Err(e)) => Err(TransportError::Handshake(e.to_string())),
        None => Err(TransportError::Handshake(
            "link closed before announce".into(),
        )),
    }
}

/// Pumps inbound frames from one link into the shared inbound stream.
/// Removes the link from the table when the stream ends.
async fn pump<S>(
    remote: PeerId,
    mut stream: S,
    inbound: InboundSender,
    links: Arc<Mutex<HashMap<PeerId, BoxSink>>>,
) where
    S: Stream<Item = Result<Message, WsError>> + Send + Unpin + 'static,
{
    loop {
        match stream.next().await {
            Some(Ok(Message::Binary(data))) => {
                if inbound.send((remote, data.into())).is_err() {
                    break;
                }
            }
            Some(Ok(Message::Text(text))) => {
                if inbound
                    .send((remote, text.as_bytes().to_vec()))
                    .is_err()
                {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => continue, // ping/pong/frame
            Some(Err(error)) => {
                tracing::debug!(%remote, %error, "link read error");
                break;
            }
        }
    }
    links.lock().await.remove(&remote);
    tracing::info!(%remote, "peer link closed");
}

impl PeerTransport for WsMesh {
    async fn send(
        &self,
        to: PeerId,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let mut links = self.links.lock().await;
        let sink = links
            .get_mut(&to)
            .ok_or(TransportError::UnknownPeer(to))?;
        sink.send(Message::Binary(data.to_vec().into()))
            .await
            .map_err(broken_pipe)
    }

    async fn broadcast(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut links = self.links.lock().await;
        let mut dead = Vec::new();
        for (&peer, sink) in links.iter_mut() {
            if let Err(error) = sink
                .send(Message::Binary(data.to_vec().into()))
                .await
            {
                tracing::debug!(%peer, %error, "broadcast send failed");
                dead.push(peer);
            }
        }
        for peer in dead {
            links.remove(&peer);
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
        if let Some(task) = self.accept_task.lock().await.take() {
            task.abort();
        }
        let mut links = self.links.lock().await;
        for (peer, sink) in links.iter_mut() {
            if let Err(error) = sink.send(Message::Close(None)).await {
                tracing::debug!(%peer, %error, "close frame failed");
            }
        }
        links.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn pair() -> (WsMesh, InboundReceiver, WsMesh, InboundReceiver)
    {
        let (a, a_rx) =
            WsMesh::bind(PeerId(1), "127.0.0.1:0").await.unwrap();
        let (b, b_rx) =
            WsMesh::bind(PeerId(2), "127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", b.local_addr());
        let remote = a.connect(&url).await.unwrap();
        assert_eq!(remote, PeerId(2));
        // Give the accept side a beat to finish registering.
        tokio::time::sleep(Duration::from_millis(20)).await;
        (a, a_rx, b, b_rx)
    }

    #[tokio::test]
    async fn test_connect_announces_both_ids() {
        let (a, _a_rx, b, _b_rx) = pair().await;
        assert_eq!(a.peers().await, vec![PeerId(2)]);
        assert_eq!(b.peers().await, vec![PeerId(1)]);
    }

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (a, mut a_rx, b, mut b_rx) = pair().await;

        a.send(PeerId(2), b"ping").await.unwrap();
        let (from, data) = b_rx.recv().await.unwrap();
        assert_eq!(from, PeerId(1));
        assert_eq!(data, b"ping");

        b.send(PeerId(1), b"pong").await.unwrap();
        let (from, data) = a_rx.recv().await.unwrap();
        assert_eq!(from, PeerId(2));
        assert_eq!(data, b"pong");
    }

    #[tokio::test]
    async fn test_broadcast_covers_every_link() {
        let (a, _a_rx, _b, mut b_rx) = pair().await;
        a.broadcast(b"all").await.unwrap();
        let (_, data) = b_rx.recv().await.unwrap();
        assert_eq!(data, b"all");
    }

    #[tokio::test]
    async fn test_send_to_unknown_peer_fails() {
        let (a, _a_rx, _b, _b_rx) = pair().await;
        assert!(matches!(
            a.send(PeerId(9), b"x").await,
            Err(TransportError::UnknownPeer(_))
        ));
    }

    #[tokio::test]
    async fn test_close_tears_down_links_idempotently() {
        let (a, _a_rx, _b, _b_rx) = pair().await;
        a.close().await.unwrap();
        a.close().await.unwrap();
        assert!(a.peers().await.is_empty());
    }
}
