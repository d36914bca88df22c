//! The canonical event schema.
//!
//! Events are the only thing peers exchange about a game, so these types
//! ARE the wire format. The payload enum is internally tagged
//! (`#[serde(tag = "type")]`), which keeps the JSON flat and lets other
//! stacks dispatch on a single `type` field. The set is closed but
//! forward-compatible: an unrecognized `type` decodes to
//! [`EventPayload::Unknown`], which the reducer treats as a no-op.

use std::fmt;

use fasttrack_board::PlayerId;
use fasttrack_engine::{CardId, GameConfig, Move, PegId};
use serde::{Deserialize, Serialize};

use crate::EventError;

/// A stable identity for one peer of a session.
///
/// Peers mint their own ids once and keep them for the session's life;
/// with a cooperative peer set (see the crate docs on the trust model)
/// random 64-bit ids collide with negligible probability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl PeerId {
    /// Mints a fresh random peer id.
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{:08x}", self.0)
    }
}

/// A unique identifier for one event.
///
/// Random, minted by the dispatching peer. Ids never influence the game
/// state; they exist purely for duplicate suppression, so they need no
/// coordination and no determinism.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl EventId {
    /// Mints a fresh random event id. Never nil.
    pub fn random() -> Self {
        loop {
            let id: u64 = rand::random();
            if id != 0 {
                return Self(id);
            }
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt-{:016x}", self.0)
    }
}

/// The closed set of event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    /// The session's game was created with this configuration. Carried
    /// so late joiners can rebuild from sequence 1.
    GameCreated {
        /// The shared configuration, seed included.
        config: GameConfig,
    },

    /// A peer claimed a seat.
    PlayerJoined {
        /// The claimed seat.
        player: PlayerId,
        /// Display name for the seat.
        name: String,
        /// Whether the seat is bot-driven.
        is_bot: bool,
    },

    /// A peer released its seat.
    PlayerLeft {
        /// The released seat.
        player: PlayerId,
    },

    /// Decks shuffle, hands deal, turn one begins.
    GameStarted,

    /// A player drew cards into their hand.
    CardDrawn {
        /// Who drew.
        player: PlayerId,
        /// How many cards.
        count: usize,
    },

    /// A player moved a card from hand to discard.
    CardPlayed {
        /// Who played.
        player: PlayerId,
        /// The card.
        card: CardId,
    },

    /// A resolved move was applied. The authoritative transition: the
    /// embedded move carries its capture and swap partners.
    PegMoved {
        /// The resolved move.
        mv: Move,
    },

    /// Notification that a capture happened inside a `PegMoved`.
    /// Derived; the reducer ignores it (flavor layers subscribe to it).
    PegCaptured {
        /// The captured peg.
        peg: PegId,
        /// The capturing peg.
        by: PegId,
    },

    /// A player ended their turn.
    TurnEnded {
        /// Whose turn ended.
        player: PlayerId,
        /// Whether they opted into the extra turn their card grants.
        play_again: bool,
    },

    /// Notification that an extra turn was granted. Derived; no-op in
    /// the reducer.
    PlayAgain {
        /// Who keeps the turn.
        player: PlayerId,
    },

    /// Notification that a player satisfied the win condition. Derived;
    /// no-op in the reducer (rankings update inside `PegMoved`).
    PlayerFinished {
        /// Who finished.
        player: PlayerId,
    },

    /// The game is over for everyone.
    GameEnded,

    /// A peer detected a sequence gap and asks for history.
    /// Transport-level: exchanged but never appended to a log.
    SyncRequest {
        /// The last sequence the requester holds.
        last_sequence: u64,
    },

    /// History in response to a `SyncRequest`.
    SyncResponse {
        /// Every event after the requested sequence, in order.
        events: Vec<GameEvent>,
        /// The responder's state hash, for divergence detection.
        state_hash: u64,
    },

    /// Periodic liveness beacon. Transport-level, never appended.
    Heartbeat {
        /// Sender's clock, milliseconds since the epoch.
        sent_at: u64,
    },

    /// Any event type this build does not know. Decodes cleanly and
    /// reduces as a no-op so newer peers can talk to older ones.
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    /// Transport-level payloads are exchanged between peers but never
    /// belong in an event log.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EventPayload::SyncRequest { .. }
                | EventPayload::SyncResponse { .. }
                | EventPayload::Heartbeat { .. }
        )
    }
}

/// One event: the unit of history, gossip, and replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Unique id, minted by the dispatching peer.
    pub id: EventId,
    /// Position in the session's history. Strictly monotonic within a
    /// log; assigned by the dispatching peer from its own log.
    pub sequence: u64,
    /// Dispatch time, milliseconds since the epoch. Informational.
    pub timestamp: u64,
    /// The dispatching peer.
    pub actor: PeerId,
    /// What happened.
    #[serde(flatten)]
    pub payload: EventPayload,
    /// The dispatcher's state hash after applying this event locally.
    /// Optional; receivers may use it for early divergence hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<u64>,
}

impl GameEvent {
    /// Field validation applied at the log-append boundary: a nil id,
    /// zero sequence, or zero timestamp marks a malformed event.
    ///
    /// # Errors
    /// [`EventError::MissingField`] naming the first bad field.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.id.0 == 0 {
            return Err(EventError::MissingField("id"));
        }
        if self.sequence == 0 {
            return Err(EventError::MissingField("sequence"));
        }
        if self.timestamp == 0 {
            return Err(EventError::MissingField("timestamp"));
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn event(payload: EventPayload) -> GameEvent {
        GameEvent {
            id: EventId(7),
            sequence: 1,
            timestamp: 1_000,
            actor: PeerId(42),
            payload,
            checksum: None,
        }
    }

    #[test]
    fn test_payload_tag_is_flattened_next_to_the_header() {
        let ev = event(EventPayload::TurnEnded {
            player: PlayerId(2),
            play_again: true,
        });
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "TurnEnded");
        assert_eq!(json["player"], 2);
        assert_eq!(json["play_again"], true);
        assert_eq!(json["sequence"], 1);
        assert_eq!(json["actor"], 42);
        // Absent checksum is omitted entirely.
        assert!(json.get("checksum").is_none());
    }

    #[test]
    fn test_unit_payload_json_shape() {
        let ev = event(EventPayload::GameStarted);
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "GameStarted");
    }

    #[test]
    fn test_unknown_event_type_decodes_to_unknown() {
        let json = r#"{
            "id": 9, "sequence": 3, "timestamp": 5, "actor": 1,
            "type": "TimeTravel", "years": -100
        }"#;
        let ev: GameEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.payload, EventPayload::Unknown);
        assert_eq!(ev.sequence, 3);
    }

    #[test]
    fn test_sync_response_round_trips_with_nested_events() {
        let inner = event(EventPayload::GameStarted);
        let ev = event(EventPayload::SyncResponse {
            events: vec![inner],
            state_hash: 0xDEAD_BEEF,
        });
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: GameEvent =
            serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_transport_payloads_are_flagged() {
        assert!(
            EventPayload::Heartbeat { sent_at: 1 }.is_transport()
        );
        assert!(
            EventPayload::SyncRequest { last_sequence: 0 }
                .is_transport()
        );
        assert!(!EventPayload::GameStarted.is_transport());
    }

    #[test]
    fn test_validate_rejects_nil_fields() {
        let mut ev = event(EventPayload::GameStarted);
        ev.id = EventId(0);
        assert!(matches!(
            ev.validate(),
            Err(EventError::MissingField("id"))
        ));

        let mut ev = event(EventPayload::GameStarted);
        ev.sequence = 0;
        assert!(matches!(
            ev.validate(),
            Err(EventError::MissingField("sequence"))
        ));

        let mut ev = event(EventPayload::GameStarted);
        ev.timestamp = 0;
        assert!(matches!(
            ev.validate(),
            Err(EventError::MissingField("timestamp"))
        ));
    }

    #[test]
    fn test_random_ids_are_never_nil() {
        for _ in 0..64 {
            assert_ne!(EventId::random().0, 0);
        }
    }

    #[test]
    fn test_peer_id_display_is_hex() {
        assert_eq!(PeerId(0xAB).to_string(), "peer-000000ab");
    }
}
