//! Pegs and their coarse lifecycle state.

use std::fmt;

use fasttrack_board::{PlayerId, PositionId, PositionKind};
use serde::{Deserialize, Serialize};

/// A unique identifier for one peg.
///
/// Derived from the owning seat and the peg's slot number so ids are
/// stable across peers without coordination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PegId(pub u16);

impl PegId {
    /// Pegs are numbered `seat * 8 + slot`; eight leaves headroom over
    /// the configured maximum of five pegs per player.
    pub fn new(player: PlayerId, slot: usize) -> Self {
        Self(player.0 as u16 * 8 + slot as u16)
    }
}

impl fmt::Display for PegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peg-{}", self.0)
    }
}

/// Where a peg is in its journey, coarsely.
///
/// Always derivable from the kind of the peg's position; carried on the
/// peg so observers (win detection, UIs) don't resolve the board for
/// every check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PegState {
    /// Waiting in the holding pen.
    InHolding,
    /// Somewhere on the shared track, the ring, or the center.
    OnTrack,
    /// Inside the owner's safe zone.
    InSafe,
    /// Parked on the winner slot.
    Finished,
}

impl PegState {
    /// The coarse state implied by standing on a cell of this kind.
    pub fn from_kind(kind: PositionKind) -> Self {
        match kind {
            PositionKind::Holding => PegState::InHolding,
            PositionKind::OuterRim
            | PositionKind::FastTrack
            | PositionKind::Center => PegState::OnTrack,
            PositionKind::Safe => PegState::InSafe,
            PositionKind::Winner => PegState::Finished,
        }
    }
}

/// One peg on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peg {
    /// Unique id.
    pub id: PegId,
    /// Owning seat.
    pub player: PlayerId,
    /// The cell the peg stands on.
    pub position: PositionId,
    /// Coarse lifecycle state, kept in step with `position`.
    pub state: PegState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peg_ids_are_stable_and_distinct() {
        assert_eq!(PegId::new(PlayerId(0), 0), PegId(0));
        assert_eq!(PegId::new(PlayerId(0), 4), PegId(4));
        assert_eq!(PegId::new(PlayerId(3), 2), PegId(26));
    }

    #[test]
    fn test_state_from_kind_covers_every_cell_kind() {
        assert_eq!(
            PegState::from_kind(PositionKind::Holding),
            PegState::InHolding
        );
        assert_eq!(
            PegState::from_kind(PositionKind::OuterRim),
            PegState::OnTrack
        );
        assert_eq!(
            PegState::from_kind(PositionKind::FastTrack),
            PegState::OnTrack
        );
        assert_eq!(
            PegState::from_kind(PositionKind::Center),
            PegState::OnTrack
        );
        assert_eq!(
            PegState::from_kind(PositionKind::Safe),
            PegState::InSafe
        );
        assert_eq!(
            PegState::from_kind(PositionKind::Winner),
            PegState::Finished
        );
    }

    #[test]
    fn test_peg_state_wire_names() {
        let json = serde_json::to_string(&PegState::InHolding).unwrap();
        assert_eq!(json, "\"IN_HOLDING\"");
        let json = serde_json::to_string(&PegState::OnTrack).unwrap();
        assert_eq!(json, "\"ON_TRACK\"");
    }
}
