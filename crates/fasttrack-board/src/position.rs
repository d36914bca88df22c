//! Identity and cell types for the board graph.
//!
//! Everything here is a plain value: cheap to copy, comparable, hashable,
//! and serializable, because peg positions travel inside moves and events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A seat at the table, 0..=5.
///
/// Newtype over `u8` so a seat can never be confused with a track index
/// or a peg number. `#[serde(transparent)]` keeps the wire shape a plain
/// number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The seat as a `usize`, for indexing zone tables.
    pub fn seat(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A unique identifier for one cell of the board.
///
/// Ids are dense and stable: track cells occupy `0..84` (their id equals
/// their track index), the center is `84`, and each seat's off-track
/// block (holding, safe, winner) follows in seat order. The numbering is
/// an implementation detail; callers should only compare ids and resolve
/// them through [`Board::position`](crate::Board::position).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PositionId(pub u16);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos-{}", self.0)
    }
}

/// What kind of cell a position is.
///
/// The rules engine branches on this to decide which moves a peg standing
/// there can make, and derives the peg's coarse lifecycle state from the
/// kind of its destination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionKind {
    /// The single bullseye cell in the middle of the board.
    Center,
    /// One of the six inner-ring shortcut holes. Also part of the
    /// circular track ordering.
    FastTrack,
    /// A shared rim cell on the circular track.
    OuterRim,
    /// A slot in a player's holding pen.
    Holding,
    /// A slot in a player's private safe zone.
    Safe,
    /// A player's winner slot, reachable only by exact landing.
    Winner,
}

/// One cell of the board. Immutable once the board is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Unique id of this cell.
    pub id: PositionId,
    /// The cell's kind.
    pub kind: PositionKind,
    /// Owning seat for per-player cells (`FastTrack`, `Holding`, `Safe`,
    /// `Winner`). `None` for shared cells (`OuterRim`, `Center`).
    pub owner: Option<PlayerId>,
    /// Kind-specific index: the track index for track cells, the slot
    /// number for holding/safe slots, 0 otherwise.
    pub index: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(4).to_string(), "P4");
    }

    #[test]
    fn test_position_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PositionId(84)).unwrap();
        assert_eq!(json, "84");
    }

    #[test]
    fn test_position_kind_wire_names_are_screaming_snake() {
        let json = serde_json::to_string(&PositionKind::FastTrack).unwrap();
        assert_eq!(json, "\"FAST_TRACK\"");
        let json = serde_json::to_string(&PositionKind::OuterRim).unwrap();
        assert_eq!(json, "\"OUTER_RIM\"");
    }

    #[test]
    fn test_position_round_trip() {
        let pos = Position {
            id: PositionId(91),
            kind: PositionKind::Safe,
            owner: Some(PlayerId(0)),
            index: 2,
        };
        let bytes = serde_json::to_vec(&pos).unwrap();
        let decoded: Position = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(pos, decoded);
    }
}
