//! Board construction and the navigation helpers.
//!
//! The geometry is fixed: a six-seat hexagonal board. Games with fewer
//! players still play on the full board; empty seats simply never get
//! pegs. All helpers are pure functions of the immutable graph.

use crate::{BoardError, PlayerId, Position, PositionId, PositionKind};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Number of seats on the board. The board is always built for six.
pub const SEATS: usize = 6;

/// Track cells per seat section: 13 rim cells plus 1 fast-track hole.
pub const SECTION_LEN: usize = 14;

/// Total cells in the circular track ordering (rim cells and holes).
pub const TRACK_LEN: usize = SEATS * SECTION_LEN;

/// Outer-rim cells only (the track minus the six holes).
pub const RIM_LEN: usize = TRACK_LEN - SEATS;

/// Holding-pen slots per seat.
pub const HOLDING_SLOTS: usize = 4;

/// Safe-zone slots per seat. Slot 0 is nearest the entrance, slot 3 is
/// nearest the winner slot.
pub const SAFE_SLOTS: usize = 4;

/// Section offset of a seat's fast-track home hole.
pub const HOME_HOLE_OFFSET: usize = 7;

/// Section offset of a seat's safe-zone entrance cell.
pub const SAFE_ENTRANCE_OFFSET: usize = 12;

/// Section offset of a seat's entry slot (where pegs leave holding).
/// One step past the entrance, so a fresh peg travels almost a full lap.
pub const ENTRY_OFFSET: usize = 13;

// ---------------------------------------------------------------------------
// PlayerZone
// ---------------------------------------------------------------------------

/// The per-seat cells and landmarks, precomputed at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerZone {
    /// Track index of the seat's entry slot.
    pub entry: usize,
    /// Track index of the seat's fast-track home hole.
    pub home_hole: usize,
    /// Track index of the seat's safe-zone entrance.
    pub safe_entrance: usize,
    /// Holding-pen slots, lowest index first.
    pub holding: [PositionId; HOLDING_SLOTS],
    /// Safe-zone slots, entrance side first.
    pub safe: [PositionId; SAFE_SLOTS],
    /// The winner slot.
    pub winner: PositionId,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The full, immutable position graph.
///
/// Built once per process with [`Board::six_player`] and shared by
/// reference. Positions are stored dense so `positions[id]` resolves in
/// O(1).
#[derive(Debug, Clone)]
pub struct Board {
    positions: Vec<Position>,
    zones: Vec<PlayerZone>,
    center: PositionId,
}

impl Board {
    /// Builds the canonical six-seat board and validates its invariants.
    ///
    /// # Errors
    /// Returns a [`BoardError`] if the layout tables are internally
    /// inconsistent. This cannot happen for the shipped constants; the
    /// check exists so layout edits fail loudly.
    pub fn six_player() -> Result<Self, BoardError> {
        let mut positions = Vec::with_capacity(
            TRACK_LEN + 1 + SEATS * (HOLDING_SLOTS + SAFE_SLOTS + 1),
        );

        // Track cells: id == track index. Every 14th-cell hole belongs to
        // the seat whose section it sits in.
        for i in 0..TRACK_LEN {
            let seat = (i / SECTION_LEN) as u8;
            let kind = if i % SECTION_LEN == HOME_HOLE_OFFSET {
                PositionKind::FastTrack
            } else {
                PositionKind::OuterRim
            };
            positions.push(Position {
                id: PositionId(i as u16),
                kind,
                owner: (kind == PositionKind::FastTrack)
                    .then_some(PlayerId(seat)),
                index: i as u16,
            });
        }

        let center = PositionId(TRACK_LEN as u16);
        positions.push(Position {
            id: center,
            kind: PositionKind::Center,
            owner: None,
            index: 0,
        });

        // Per-seat off-track block: 4 holding, 4 safe, 1 winner.
        let mut zones = Vec::with_capacity(SEATS);
        let mut next_id = TRACK_LEN as u16 + 1;
        for seat in 0..SEATS {
            let owner = PlayerId(seat as u8);
            let mut holding = [PositionId(0); HOLDING_SLOTS];
            for (slot, cell) in holding.iter_mut().enumerate() {
                *cell = PositionId(next_id);
                positions.push(Position {
                    id: *cell,
                    kind: PositionKind::Holding,
                    owner: Some(owner),
                    index: slot as u16,
                });
                next_id += 1;
            }
            let mut safe = [PositionId(0); SAFE_SLOTS];
            for (slot, cell) in safe.iter_mut().enumerate() {
                *cell = PositionId(next_id);
                positions.push(Position {
                    id: *cell,
                    kind: PositionKind::Safe,
                    owner: Some(owner),
                    index: slot as u16,
                });
                next_id += 1;
            }
            let winner = PositionId(next_id);
            positions.push(Position {
                id: winner,
                kind: PositionKind::Winner,
                owner: Some(owner),
                index: 0,
            });
            next_id += 1;

            zones.push(PlayerZone {
                entry: seat * SECTION_LEN + ENTRY_OFFSET,
                home_hole: seat * SECTION_LEN + HOME_HOLE_OFFSET,
                safe_entrance: seat * SECTION_LEN + SAFE_ENTRANCE_OFFSET,
                holding,
                safe,
                winner,
            });
        }

        let board = Self {
            positions,
            zones,
            center,
        };
        board.validate()?;
        Ok(board)
    }

    fn validate(&self) -> Result<(), BoardError> {
        // Ids must be dense and in storage order.
        for (i, pos) in self.positions.iter().enumerate() {
            if pos.id.0 as usize != i {
                return Err(BoardError::DuplicateId(pos.id.0));
            }
        }

        let count = |kind: PositionKind| {
            self.positions.iter().filter(|p| p.kind == kind).count()
        };
        let expect =
            |kind: &'static str, got: usize, expected: usize| {
                if got == expected {
                    Ok(())
                } else {
                    Err(BoardError::CellCount {
                        kind,
                        got,
                        expected,
                    })
                }
            };
        expect("outer rim", count(PositionKind::OuterRim), RIM_LEN)?;
        expect("fast track", count(PositionKind::FastTrack), SEATS)?;
        expect("center", count(PositionKind::Center), 1)?;
        expect(
            "holding",
            count(PositionKind::Holding),
            SEATS * HOLDING_SLOTS,
        )?;
        expect("safe", count(PositionKind::Safe), SEATS * SAFE_SLOTS)?;
        expect("winner", count(PositionKind::Winner), SEATS)?;

        for (seat, zone) in self.zones.iter().enumerate() {
            let check = |id: PositionId,
                         kind: PositionKind|
             -> Result<(), BoardError> {
                let pos = self.position(id).ok_or_else(|| {
                    BoardError::ZoneMismatch {
                        seat: seat as u8,
                        detail: format!("missing cell {id}"),
                    }
                })?;
                if pos.kind != kind
                    || pos.owner != Some(PlayerId(seat as u8))
                {
                    return Err(BoardError::ZoneMismatch {
                        seat: seat as u8,
                        detail: format!(
                            "cell {id} is {:?}/{:?}",
                            pos.kind, pos.owner
                        ),
                    });
                }
                Ok(())
            };
            for &cell in &zone.holding {
                check(cell, PositionKind::Holding)?;
            }
            for &cell in &zone.safe {
                check(cell, PositionKind::Safe)?;
            }
            check(zone.winner, PositionKind::Winner)?;
        }
        Ok(())
    }

    // -- Lookups ----------------------------------------------------------

    /// Resolves a position id to its cell record.
    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.get(id.0 as usize)
    }

    /// The single center (bullseye) cell.
    pub fn center(&self) -> PositionId {
        self.center
    }

    /// The per-seat zone table.
    ///
    /// # Panics
    /// Panics if `player` is not one of the six seats; seats are
    /// validated at the configuration boundary.
    pub fn zone(&self, player: PlayerId) -> &PlayerZone {
        &self.zones[player.seat()]
    }

    /// All cells of the circular track, in track order.
    pub fn track_cells(&self) -> impl Iterator<Item = PositionId> + '_ {
        (0..TRACK_LEN).map(|i| PositionId(i as u16))
    }

    // -- Track arithmetic -------------------------------------------------

    /// The cell at a circular track index (wraps modulo [`TRACK_LEN`]).
    pub fn track_position(&self, index: usize) -> PositionId {
        PositionId((index % TRACK_LEN) as u16)
    }

    /// The track index of a cell, or `None` for off-track cells.
    pub fn track_index(&self, id: PositionId) -> Option<usize> {
        let raw = id.0 as usize;
        (raw < TRACK_LEN).then_some(raw)
    }

    /// The track index `steps` forward of `from`, with wraparound.
    pub fn forward(&self, from: usize, steps: usize) -> usize {
        (from + steps) % TRACK_LEN
    }

    /// The track index `steps` backward of `from`, with wraparound.
    pub fn backward(&self, from: usize, steps: usize) -> usize {
        (from + TRACK_LEN - steps % TRACK_LEN) % TRACK_LEN
    }

    // -- Kind queries -----------------------------------------------------

    /// Is this cell one of the six fast-track holes?
    pub fn is_fast_track(&self, id: PositionId) -> bool {
        self.position(id)
            .is_some_and(|p| p.kind == PositionKind::FastTrack)
    }

    /// Is this cell inside some player's safe zone?
    pub fn is_in_safe_zone(&self, id: PositionId) -> bool {
        self.position(id)
            .is_some_and(|p| p.kind == PositionKind::Safe)
    }

    /// Is this cell a winner slot?
    pub fn is_winner_position(&self, id: PositionId) -> bool {
        self.position(id)
            .is_some_and(|p| p.kind == PositionKind::Winner)
    }

    /// The slot number of a safe-zone cell (0 nearest the entrance).
    pub fn safe_index(&self, id: PositionId) -> Option<usize> {
        self.position(id)
            .filter(|p| p.kind == PositionKind::Safe)
            .map(|p| p.index as usize)
    }

    /// The ring number of a fast-track hole (equal to the owning seat),
    /// or `None` for any other cell.
    pub fn fast_track_index(&self, id: PositionId) -> Option<usize> {
        self.position(id)
            .filter(|p| p.kind == PositionKind::FastTrack)
            .and_then(|p| p.owner)
            .map(PlayerId::seat)
    }

    /// The track index of ring hole `ring` (wraps modulo [`SEATS`]).
    pub fn hole_track_index(&self, ring: usize) -> usize {
        (ring % SEATS) * SECTION_LEN + HOME_HOLE_OFFSET
    }

    /// Forward-only distance from a track index to `player`'s safe-zone
    /// entrance. Zero when standing on the entrance itself.
    pub fn steps_to_exit(&self, from: usize, player: PlayerId) -> usize {
        let entrance = self.zones[player.seat()].safe_entrance;
        (entrance + TRACK_LEN - from % TRACK_LEN) % TRACK_LEN
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::six_player().expect("canonical board builds")
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    #[test]
    fn test_track_has_84_cells_78_rim_6_holes() {
        let b = board();
        assert_eq!(TRACK_LEN, 84);
        assert_eq!(RIM_LEN, 78);
        let holes = b
            .track_cells()
            .filter(|&id| b.is_fast_track(id))
            .count();
        assert_eq!(holes, SEATS);
    }

    #[test]
    fn test_every_seat_has_full_zone_tables() {
        let b = board();
        for seat in 0..SEATS {
            let zone = b.zone(PlayerId(seat as u8));
            assert_eq!(zone.holding.len(), 4);
            assert_eq!(zone.safe.len(), 4);
            assert!(b.is_winner_position(zone.winner));
            assert!(b.is_fast_track(b.track_position(zone.home_hole)));
        }
    }

    #[test]
    fn test_landmarks_sit_at_expected_section_offsets() {
        let b = board();
        let zone = b.zone(PlayerId(2));
        assert_eq!(zone.home_hole, 2 * 14 + 7);
        assert_eq!(zone.safe_entrance, 2 * 14 + 12);
        assert_eq!(zone.entry, 2 * 14 + 13);
    }

    #[test]
    fn test_hole_owner_matches_ring_number() {
        let b = board();
        for ring in 0..SEATS {
            let idx = b.hole_track_index(ring);
            let id = b.track_position(idx);
            assert_eq!(b.fast_track_index(id), Some(ring));
        }
    }

    // =====================================================================
    // Track arithmetic
    // =====================================================================

    #[test]
    fn test_forward_wraps_past_the_top() {
        let b = board();
        assert_eq!(b.forward(83, 1), 0);
        assert_eq!(b.forward(80, 10), 6);
    }

    #[test]
    fn test_backward_wraps_past_zero() {
        let b = board();
        assert_eq!(b.backward(0, 1), 83);
        assert_eq!(b.backward(2, 4), 82);
    }

    #[test]
    fn test_track_position_wraps_modulo_track_len() {
        let b = board();
        assert_eq!(b.track_position(84), PositionId(0));
        assert_eq!(b.track_position(85), PositionId(1));
    }

    #[test]
    fn test_track_index_rejects_off_track_cells() {
        let b = board();
        assert_eq!(b.track_index(PositionId(0)), Some(0));
        assert_eq!(b.track_index(b.center()), None);
        let zone = b.zone(PlayerId(0));
        assert_eq!(b.track_index(zone.safe[0]), None);
    }

    // =====================================================================
    // steps_to_exit: the boundary arithmetic the rules engine leans on.
    // =====================================================================

    #[test]
    fn test_steps_to_exit_is_zero_on_own_entrance() {
        let b = board();
        for seat in 0..SEATS as u8 {
            let p = PlayerId(seat);
            assert_eq!(b.steps_to_exit(b.zone(p).safe_entrance, p), 0);
        }
    }

    #[test]
    fn test_steps_to_exit_from_entry_slot_is_nearly_a_full_lap() {
        // The entry slot sits one cell past the entrance, so the journey
        // back to it is TRACK_LEN - 1 forward steps.
        let b = board();
        for seat in 0..SEATS as u8 {
            let p = PlayerId(seat);
            assert_eq!(
                b.steps_to_exit(b.zone(p).entry, p),
                TRACK_LEN - 1
            );
        }
    }

    #[test]
    fn test_steps_to_exit_one_before_entrance() {
        let b = board();
        let p = PlayerId(0);
        let entrance = b.zone(p).safe_entrance;
        assert_eq!(b.steps_to_exit(b.backward(entrance, 1), p), 1);
    }

    #[test]
    fn test_steps_to_exit_from_home_hole_is_five() {
        let b = board();
        for seat in 0..SEATS as u8 {
            let p = PlayerId(seat);
            assert_eq!(b.steps_to_exit(b.zone(p).home_hole, p), 5);
        }
    }

    // =====================================================================
    // Construction invariants
    // =====================================================================

    #[test]
    fn test_total_position_count() {
        let b = board();
        // 84 track + 1 center + 6 * (4 holding + 4 safe + 1 winner).
        assert_eq!(
            b.track_cells().count()
                + 1
                + SEATS * (HOLDING_SLOTS + SAFE_SLOTS + 1),
            139
        );
        assert!(b.position(PositionId(138)).is_some());
        assert!(b.position(PositionId(139)).is_none());
    }

    #[test]
    fn test_safe_slots_are_owned_and_indexed() {
        let b = board();
        let zone = b.zone(PlayerId(5));
        for (slot, &cell) in zone.safe.iter().enumerate() {
            assert_eq!(b.safe_index(cell), Some(slot));
            assert_eq!(
                b.position(cell).unwrap().owner,
                Some(PlayerId(5))
            );
        }
    }
}
