//! # FastTrack
//!
//! Deterministic multiplayer kernel for the six-player track-and-capture
//! board game: a pure rules engine, an event-sourced history, and a
//! peer-to-peer synchronization layer with no central authority.
//!
//! The member crates are layered leaf-first:
//!
//! ```text
//! fasttrack-board    the immutable position graph
//! fasttrack-engine   cards, pegs, move generation, turn flow
//! fasttrack-events   event schema, append-only log, total reducer
//! fasttrack-sync     transports, gap detection, resync, peer node
//! fasttrack          this facade: prelude, local session, reactions
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use fasttrack::prelude::*;
//!
//! let config = GameConfig { num_players: 2, seed: 42, ..GameConfig::default() };
//! let mut session = LocalSession::new(config.clone()).unwrap();
//! session.dispatch(EventPayload::GameCreated { config }).unwrap();
//! session.dispatch(EventPayload::GameStarted).unwrap();
//! assert_eq!(session.state().phase, GamePhase::Playing);
//! ```
//!
//! For a networked game, spawn a [`prelude::NodeHandle`] per peer over
//! a transport (`memory_mesh` in-process, `WsMesh` across machines) via
//! [`prelude::spawn_node`].

mod reactions;
mod session;

pub use reactions::{Mood, Personality, Reaction, react};
pub use session::{LOCAL_PEER, LocalSession};

/// The commonly needed surface of every layer, one import away.
pub mod prelude {
    pub use fasttrack_board::{
        Board, PlayerId, Position, PositionId, PositionKind,
    };
    pub use fasttrack_engine::{
        Card, CardId, GameConfig, GamePhase, GameState, Move, MoveKind,
        Peg, PegId, PegState, Rank, RuleViolation, Suit, apply_move,
        end_turn, init_game, play_card, valid_moves, validate_move,
    };
    pub use fasttrack_events::{
        EventId, EventLog, EventPayload, GameEvent, PeerId, apply_event,
        rebuild, state_hash,
    };
    pub use fasttrack_sync::{
        ConnectionState, NodeHandle, PeerTransport, SessionId,
        SignalMessage, SyncConfig, SyncCore, SyncError, memory_mesh,
        spawn_node,
    };
    #[cfg(feature = "websocket")]
    pub use fasttrack_sync::WsMesh;

    pub use crate::{LocalSession, Personality, Reaction, react};
}
