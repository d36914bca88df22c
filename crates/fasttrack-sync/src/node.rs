//! The peer node actor: one task that owns a [`SyncCore`] and a
//! transport, plus the cheap [`NodeHandle`] the host talks to.
//!
//! The actor model keeps the per-peer execution single-threaded and
//! event-driven: commands, inbound frames, and the heartbeat interval
//! all funnel through one `select!` loop, so the state never needs a
//! lock and no handler blocks another.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use fasttrack_engine::GameState;
use fasttrack_events::{GameEvent, PeerId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::{
    ConnectionState, ConnectionTracker, InboundReceiver, PeerTransport,
    SyncAction, SyncConfig, SyncCore, SyncError,
};

/// Commands the handle sends to the actor.
enum NodeCommand {
    Dispatch {
        payload: fasttrack_events::EventPayload,
        reply: oneshot::Sender<Result<GameEvent, SyncError>>,
    },
    GetState {
        reply: oneshot::Sender<GameState>,
    },
    GetHash {
        reply: oneshot::Sender<u64>,
    },
    GetPeers {
        reply: oneshot::Sender<Vec<(PeerId, bool)>>,
    },
    GetLog {
        reply: oneshot::Sender<Vec<GameEvent>>,
    },
    RebuildState {
        reply: oneshot::Sender<Result<u64, SyncError>>,
    },
    Shutdown,
}

/// Handle to a running peer node. Cheap to clone.
#[derive(Clone)]
pub struct NodeHandle {
    sender: mpsc::Sender<NodeCommand>,
    connection: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<GameEvent>,
    states: broadcast::Sender<GameState>,
}

impl NodeHandle {
    /// Dispatches a local event: applied optimistically, appended, and
    /// broadcast to every peer.
    ///
    /// # Errors
    /// Rules/log rejections from the core, or
    /// [`SyncError::NodeClosed`] after `disconnect`.
    pub async fn dispatch(
        &self,
        payload: fasttrack_events::EventPayload,
    ) -> Result<GameEvent, SyncError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(NodeCommand::Dispatch {
                payload,
                reply: tx,
            })
            .await
            .map_err(|_| SyncError::NodeClosed)?;
        rx.await.map_err(|_| SyncError::NodeClosed)?
    }

    /// A snapshot of the live state.
    pub async fn state(&self) -> Result<GameState, SyncError> {
        self.request(|reply| NodeCommand::GetState { reply }).await
    }

    /// The live state's digest.
    pub async fn state_hash(&self) -> Result<u64, SyncError> {
        self.request(|reply| NodeCommand::GetHash { reply }).await
    }

    /// Every peer heard from, with local liveness verdicts.
    pub async fn peers(
        &self,
    ) -> Result<Vec<(PeerId, bool)>, SyncError> {
        self.request(|reply| NodeCommand::GetPeers { reply }).await
    }

    /// A snapshot of the event log.
    pub async fn event_log(&self) -> Result<Vec<GameEvent>, SyncError> {
        self.request(|reply| NodeCommand::GetLog { reply }).await
    }

    /// Replays the full log from scratch and swaps it in as the live
    /// state; returns the rebuilt hash.
    pub async fn rebuild_state(&self) -> Result<u64, SyncError> {
        self.request(|reply| NodeCommand::RebuildState { reply })
            .await?
    }

    /// The current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    /// Subscription to connection transitions.
    pub fn subscribe_connection(
        &self,
    ) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    /// Subscription to state snapshots (one per applied change).
    pub fn subscribe_state(&self) -> broadcast::Receiver<GameState> {
        self.states.subscribe()
    }

    /// Subscription to every event this node applies, local or remote.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Tears the node down: heartbeats stop, channels close, the
    /// connection state goes to `disconnected`. Idempotent.
    pub async fn disconnect(&self) {
        // A closed channel means the node is already down.
        let _ = self.sender.send(NodeCommand::Shutdown).await;
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> NodeCommand,
    ) -> Result<R, SyncError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| SyncError::NodeClosed)?;
        rx.await.map_err(|_| SyncError::NodeClosed)
    }
}

/// Spawns a peer node over an already-connected transport.
///
/// # Errors
/// Configuration errors from the engine.
pub fn spawn_node<T: PeerTransport>(
    config: SyncConfig,
    transport: T,
    inbound: InboundReceiver,
) -> Result<NodeHandle, SyncError> {
    let core = SyncCore::new(config)?;
    let (tracker, connection) = ConnectionTracker::new();
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (event_tx, _) = broadcast::channel(256);
    let (state_tx, _) = broadcast::channel(64);

    let actor = NodeActor {
        core,
        transport,
        inbound,
        commands: cmd_rx,
        tracker,
        events: event_tx.clone(),
        states: state_tx.clone(),
    };
    tokio::spawn(actor.run());

    Ok(NodeHandle {
        sender: cmd_tx,
        connection,
        events: event_tx,
        states: state_tx,
    })
}

struct NodeActor<T: PeerTransport> {
    core: SyncCore,
    transport: T,
    inbound: InboundReceiver,
    commands: mpsc::Receiver<NodeCommand>,
    tracker: ConnectionTracker,
    events: broadcast::Sender<GameEvent>,
    states: broadcast::Sender<GameState>,
}

impl<T: PeerTransport> NodeActor<T> {
    async fn run(mut self) {
        let peer = self.core.config().peer;
        tracing::info!(%peer, "peer node started");
        self.tracker.transition(ConnectionState::Connecting);
        self.tracker.transition(ConnectionState::Connected);

        // Random offset on the first beat so peers started in the same
        // instant don't thunder in lockstep.
        let jitter = rand::random_range(0..250u64);
        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now()
                + std::time::Duration::from_millis(jitter),
            self.core.config().heartbeat_interval,
        );

        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(NodeCommand::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }
                frame = self.inbound.recv() => {
                    match frame {
                        Some((from, data)) => {
                            self.handle_frame(from, &data).await;
                        }
                        None => {
                            tracing::warn!(%peer, "inbound stream closed");
                            self.tracker
                                .transition(ConnectionState::Error);
                            break;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    self.beat().await;
                }
            }
        }

        // Coarse, idempotent teardown.
        if let Err(error) = self.transport.close().await {
            tracing::debug!(%error, "transport close reported an error");
        }
        self.tracker.transition(ConnectionState::Disconnected);
        tracing::info!(%peer, "peer node stopped");
    }

    async fn handle_command(&mut self, cmd: NodeCommand) {
        match cmd {
            NodeCommand::Dispatch { payload, reply } => {
                let result =
                    match self.core.dispatch(payload, now_millis()) {
                        Ok(event) => {
                            self.execute(SyncAction::Broadcast(
                                event.clone(),
                            ))
                            .await;
                            self.publish(&event);
                            Ok(event)
                        }
                        Err(e) => Err(e),
                    };
                let _ = reply.send(result);
            }
            NodeCommand::GetState { reply } => {
                let _ = reply.send(self.core.state().clone());
            }
            NodeCommand::GetHash { reply } => {
                let _ = reply.send(self.core.state_hash());
            }
            NodeCommand::GetPeers { reply } => {
                let _ = reply.send(self.core.peers());
            }
            NodeCommand::GetLog { reply } => {
                let _ = reply.send(self.core.log().events().to_vec());
            }
            NodeCommand::RebuildState { reply } => {
                let result = self.core.rebuild_state();
                if result.is_ok() {
                    let _ =
                        self.states.send(self.core.state().clone());
                }
                let _ = reply.send(result);
            }
            NodeCommand::Shutdown => unreachable!("handled in run"),
        }
    }

    async fn handle_frame(&mut self, from: PeerId, data: &[u8]) {
        let event: GameEvent = match serde_json::from_slice(data) {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(
                    %from,
                    %error,
                    "undecodable frame dropped"
                );
                return;
            }
        };
        let before = self.core.state_hash();
        let actions =
            self.core.handle_inbound(from, event.clone(), Instant::now());
        for action in actions {
            self.execute(action).await;
        }
        if self.core.state_hash() != before {
            self.publish(&event);
        }
    }

    async fn beat(&mut self) {
        let action = self.core.heartbeat(now_millis());
        self.execute(action).await;
        for peer in self.core.check_liveness(Instant::now()) {
            tracing::info!(%peer, "peer marked disconnected locally");
        }
    }

    async fn execute(&mut self, action: SyncAction) {
        let result = match &action {
            SyncAction::Broadcast(event) => {
                match serde_json::to_vec(event) {
                    Ok(bytes) => self.transport.broadcast(&bytes).await,
                    Err(error) => {
                        tracing::error!(%error, "event encode failed");
                        return;
                    }
                }
            }
            SyncAction::Send(to, event) => {
                match serde_json::to_vec(event) {
                    Ok(bytes) => {
                        self.transport.send(*to, &bytes).await
                    }
                    Err(error) => {
                        tracing::error!(%error, "event encode failed");
                        return;
                    }
                }
            }
        };
        if let Err(error) = result {
            // Transport failures surface on the connection machine and
            // never touch the local game state.
            tracing::warn!(%error, "transport error");
            self.tracker.transition(ConnectionState::Error);
        }
    }

    /// Publishes an applied event and the resulting state snapshot to
    /// subscribers. Send errors just mean nobody is listening.
    fn publish(&self, event: &GameEvent) {
        let _ = self.events.send(event.clone());
        let _ = self.states.send(self.core.state().clone());
    }
}

/// Wall-clock milliseconds; clamped to at least 1 so stamped events
/// always pass field validation.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
        .max(1)
}
