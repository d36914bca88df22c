//! The pure synchronization core: no I/O, no clock of its own.
//!
//! [`SyncCore`] owns this peer's `GameState` and `EventLog` and encodes
//! the whole protocol as plain functions: callers feed it local
//! dispatches, inbound events, and the current time; it returns
//! [`SyncAction`]s for the transport shell to execute. That keeps every
//! protocol decision unit-testable without a network.
//!
//! # Consistency posture
//!
//! Last-applied-by-sequence, healed by resync. Local dispatch is
//! optimistic and never gated by a pending resync; two peers can
//! transiently disagree until the next successful resync. Divergence
//! that replay cannot heal is *reported* (a warning), not auto-healed.
//!
//! # Trust model
//!
//! Peers are assumed cooperative. Nothing here authenticates an event's
//! actor or defends against fabricated or replayed history; a malicious
//! peer can corrupt a session. This is a deliberate, documented boundary
//! rather than a hidden one.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use fasttrack_engine::{GameConfig, GameState, init_game};
use fasttrack_events::{
    EventId, EventLog, EventPayload, GameEvent, PeerId, apply_event,
    rebuild, state_hash,
};

use crate::{SessionId, SyncError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for one peer of a session.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// The session this peer belongs to.
    pub session: SessionId,
    /// This peer's stable identity.
    pub peer: PeerId,
    /// The shared game configuration (seed included; it must match on
    /// every peer or replay diverges).
    pub game: GameConfig,
    /// How often to broadcast a heartbeat.
    pub heartbeat_interval: Duration,
    /// Silence past this marks a peer disconnected locally.
    pub peer_timeout: Duration,
}

impl SyncConfig {
    /// A config with default timing (2 s heartbeats, 10 s timeout).
    pub fn new(
        session: SessionId,
        peer: PeerId,
        game: GameConfig,
    ) -> Self {
        Self {
            session,
            peer,
            game,
            heartbeat_interval: Duration::from_secs(2),
            peer_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// What the transport shell should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// Send an event to every connected peer.
    Broadcast(GameEvent),
    /// Send an event to one peer.
    Send(PeerId, GameEvent),
}

// ---------------------------------------------------------------------------
// Peer liveness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct PeerHealth {
    last_seen: Instant,
    alive: bool,
}

// ---------------------------------------------------------------------------
// SyncCore
// ---------------------------------------------------------------------------

/// One peer's synchronization state machine.
pub struct SyncCore {
    config: SyncConfig,
    state: GameState,
    log: EventLog,
    peers: HashMap<PeerId, PeerHealth>,
}

impl SyncCore {
    /// Creates a core with a fresh `init_game` state.
    ///
    /// # Errors
    /// Configuration errors from the engine.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let state = init_game(&config.game)?;
        Ok(Self {
            config,
            state,
            log: EventLog::new(),
            peers: HashMap::new(),
        })
    }

    /// The live state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// The configuration this core runs with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Digest of the live state.
    pub fn state_hash(&self) -> u64 {
        state_hash(&self.state)
    }

    /// Every peer ever heard from, with local liveness verdicts.
    pub fn peers(&self) -> Vec<(PeerId, bool)> {
        let mut out: Vec<(PeerId, bool)> = self
            .peers
            .iter()
            .map(|(&id, health)| (id, health.alive))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    // -- Write path -------------------------------------------------------

    /// Dispatches a local event: optimistic apply, then append.
    ///
    /// Stamps the event with a fresh id, the log's next sequence, the
    /// caller's timestamp, this peer as actor, and the post-apply state
    /// hash as checksum. The returned event is the caller's to
    /// broadcast.
    ///
    /// # Errors
    /// [`SyncError::TransportPayload`] for protocol-internal payloads;
    /// log errors if the stamped event fails validation (zero
    /// timestamp).
    pub fn dispatch(
        &mut self,
        payload: EventPayload,
        timestamp: u64,
    ) -> Result<GameEvent, SyncError> {
        if payload.is_transport() {
            return Err(SyncError::TransportPayload);
        }
        let mut event = GameEvent {
            id: EventId::random(),
            sequence: self.log.next_sequence(),
            timestamp,
            actor: self.config.peer,
            payload,
            checksum: None,
        };
        let next = apply_event(&self.state, &event);
        event.checksum = Some(state_hash(&next));
        self.log.append(event.clone())?;
        self.state = next;
        tracing::debug!(
            event = %event.id,
            sequence = event.sequence,
            "local event dispatched"
        );
        Ok(event)
    }

    // -- Read path --------------------------------------------------------

    /// Handles one inbound event from a peer.
    pub fn handle_inbound(
        &mut self,
        from: PeerId,
        event: GameEvent,
        now: Instant,
    ) -> Vec<SyncAction> {
        self.mark_seen(from, now);
        match &event.payload {
            EventPayload::Heartbeat { .. } => Vec::new(),
            EventPayload::SyncRequest { last_sequence } => {
                self.answer_resync(from, *last_sequence)
            }
            EventPayload::SyncResponse { events, state_hash } => {
                self.apply_resync(events.clone(), *state_hash)
            }
            _ => self.ingest(from, event),
        }
    }

    /// Ordered ingestion of a game event: next-in-sequence applies,
    /// duplicates drop, a gap triggers a resync request.
    fn ingest(
        &mut self,
        from: PeerId,
        event: GameEvent,
    ) -> Vec<SyncAction> {
        if self.log.contains(event.id) {
            tracing::trace!(event = %event.id, "duplicate dropped");
            return Vec::new();
        }
        let expected = self.log.next_sequence();
        if event.sequence == expected {
            self.absorb(event);
            Vec::new()
        } else if event.sequence > expected {
            tracing::debug!(
                expected,
                got = event.sequence,
                %from,
                "sequence gap, requesting resync"
            );
            vec![SyncAction::Send(
                from,
                self.transport_event(EventPayload::SyncRequest {
                    last_sequence: self.log.last_sequence(),
                }),
            )]
        } else {
            // Sequence already covered by a different id: a fork or a
            // rewrite. With cooperative peers this means a duplicate
            // broadcast raced a resync; drop it.
            tracing::debug!(
                sequence = event.sequence,
                event = %event.id,
                "stale sequence dropped"
            );
            Vec::new()
        }
    }

    /// Appends and applies an in-order event. Malformed events fail at
    /// the append boundary and never touch the state.
    fn absorb(&mut self, event: GameEvent) {
        match self.log.append(event.clone()) {
            Ok(()) => {
                self.state = apply_event(&self.state, &event);
            }
            Err(error) => {
                tracing::warn!(
                    event = %event.id,
                    %error,
                    "inbound event rejected at append"
                );
            }
        }
    }

    fn answer_resync(
        &self,
        from: PeerId,
        last_sequence: u64,
    ) -> Vec<SyncAction> {
        let events = self.log.events_after(last_sequence);
        tracing::debug!(
            %from,
            after = last_sequence,
            count = events.len(),
            "answering resync request"
        );
        vec![SyncAction::Send(
            from,
            self.transport_event(EventPayload::SyncResponse {
                events,
                state_hash: self.state_hash(),
            }),
        )]
    }

    /// Applies a resync response: unseen events in sequence order, then
    /// a divergence check against the responder's declared hash.
    fn apply_resync(
        &mut self,
        mut events: Vec<GameEvent>,
        declared: u64,
    ) -> Vec<SyncAction> {
        events.sort_by_key(|e| e.sequence);
        for event in events {
            if self.log.contains(event.id) {
                continue;
            }
            if event.sequence != self.log.next_sequence() {
                tracing::warn!(
                    sequence = event.sequence,
                    expected = self.log.next_sequence(),
                    "resync response leaves a gap, stopping here"
                );
                break;
            }
            self.absorb(event);
        }
        let local = self.state_hash();
        if local != declared {
            // Detected, reported, and deliberately not auto-healed
            // beyond what the replay above already achieved.
            tracing::warn!(
                local = format_args!("{local:#018x}"),
                remote = format_args!("{declared:#018x}"),
                "state divergence after resync"
            );
        } else {
            tracing::debug!("resync complete, states agree");
        }
        Vec::new()
    }

    // -- Liveness ---------------------------------------------------------

    /// Notes that a peer was heard from.
    pub fn mark_seen(&mut self, peer: PeerId, now: Instant) {
        if peer == self.config.peer {
            return;
        }
        let health = self.peers.entry(peer).or_insert(PeerHealth {
            last_seen: now,
            alive: true,
        });
        health.last_seen = now;
        if !health.alive {
            tracing::info!(%peer, "peer is back");
            health.alive = true;
        }
    }

    /// Marks peers silent past the timeout as disconnected (locally;
    /// there is no global arbiter). Returns the newly dead.
    pub fn check_liveness(&mut self, now: Instant) -> Vec<PeerId> {
        let timeout = self.config.peer_timeout;
        let mut dead = Vec::new();
        for (&peer, health) in self.peers.iter_mut() {
            if health.alive
                && now.duration_since(health.last_seen) > timeout
            {
                health.alive = false;
                dead.push(peer);
                tracing::warn!(%peer, "peer timed out, marked disconnected");
            }
        }
        dead.sort();
        dead
    }

    /// Builds the periodic heartbeat broadcast.
    pub fn heartbeat(&self, timestamp: u64) -> SyncAction {
        SyncAction::Broadcast(self.transport_event(
            EventPayload::Heartbeat { sent_at: timestamp },
        ))
    }

    // -- Recovery ---------------------------------------------------------

    /// Replays the full log over a fresh `init_game` and swaps the
    /// result in as the live state. Returns the rebuilt hash; a
    /// mismatch against the previous live state is logged.
    ///
    /// # Errors
    /// Configuration errors from the engine.
    pub fn rebuild_state(&mut self) -> Result<u64, SyncError> {
        let rebuilt = rebuild(&self.config.game, self.log.events())?;
        let before = self.state_hash();
        let after = state_hash(&rebuilt);
        if before != after {
            tracing::warn!(
                live = format_args!("{before:#018x}"),
                rebuilt = format_args!("{after:#018x}"),
                "live state diverged from its own log"
            );
        }
        self.state = rebuilt;
        Ok(after)
    }

    /// An event that travels the wire but never enters a log.
    fn transport_event(&self, payload: EventPayload) -> GameEvent {
        GameEvent {
            id: EventId::random(),
            sequence: self.log.last_sequence(),
            timestamp: 1,
            actor: self.config.peer,
            payload,
            checksum: None,
        }
    }
}

impl std::fmt::Debug for SyncCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCore")
            .field("session", &self.config.session)
            .field("peer", &self.config.peer)
            .field("log", &self.log)
            .field("peers", &self.peers.len())
            .finish()
    }
}
