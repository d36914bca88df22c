//! Signaling message shapes.
//!
//! Bootstrap runs over an external relay that this crate does NOT
//! implement; it only needs to parse the roster and connection-offer
//! messages the relay forwards. The shapes are pinned by tests because
//! the relay and its other clients already speak this exact JSON. The
//! relay never carries game events.

use std::fmt;

use fasttrack_events::PeerId;
use serde::{Deserialize, Serialize};

/// A game session identity, shared by every peer of one game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{:08x}", self.0)
    }
}

/// Messages exchanged over the signaling relay during bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalMessage {
    /// A peer announces itself to a session.
    Join {
        /// The session being joined.
        session: SessionId,
        /// The joining peer.
        peer: PeerId,
    },

    /// The relay's roster of currently known peers.
    PeerList {
        /// The session the roster belongs to.
        session: SessionId,
        /// Every known peer, the addressee included.
        peers: Vec<PeerId>,
    },

    /// A connection offer from one peer to another.
    Offer {
        /// The offering peer.
        from: PeerId,
        /// The addressed peer.
        to: PeerId,
        /// Opaque session description, passed through verbatim.
        sdp: String,
    },

    /// The answer to an offer.
    Answer {
        /// The answering peer.
        from: PeerId,
        /// The peer that sent the offer.
        to: PeerId,
        /// Opaque session description, passed through verbatim.
        sdp: String,
    },

    /// A connectivity candidate for an offer/answer pair.
    IceCandidate {
        /// The peer the candidate belongs to.
        from: PeerId,
        /// The addressed peer.
        to: PeerId,
        /// Opaque candidate string, passed through verbatim.
        candidate: String,
    },
}
