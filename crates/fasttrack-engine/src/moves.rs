//! Move generation and validation.
//!
//! [`valid_moves`] is a pure function of (state, peg, card): it branches
//! on the peg's current cell kind and emits every legal landing, each as
//! a fully resolved [`Move`] (capture and swap partners included).
//! [`validate_move`] layers turn/phase/ownership checks and the
//! fast-track priority rule on top, and picks the move matching a
//! requested target.
//!
//! Distances into the safe zone are measured past the entrance cell:
//! with `d` forward steps to the entrance, `d + 1` lands on safe slot 0,
//! `d + 4` on slot 3, and `d + 5` exactly on the winner slot. Anything
//! beyond is an overshoot and generates nothing.

use fasttrack_board::{
    PlayerId, PositionId, PositionKind, SAFE_SLOTS, SEATS,
};
use serde::{Deserialize, Serialize};

use crate::{
    Card, CardId, GamePhase, GameState, Peg, PegId, PegState, Rank,
    RuleViolation,
};

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// What flavor of move this is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveKind {
    /// Leave the holding pen for the entry slot.
    ExitHolding,
    /// Forward travel along the track (including a turn into the safe
    /// zone resolved as `SafeAdvance`/`Finish` instead).
    Forward,
    /// Exactly four track cells backward.
    Backward,
    /// Hole-to-hole travel around the fast-track ring.
    RingAdvance,
    /// Step from the own home hole into the center.
    CenterEnter,
    /// Leave the center for the own home hole.
    CenterExit,
    /// Land on a safe-zone slot.
    SafeAdvance,
    /// Exact landing on the winner slot.
    Finish,
    /// Exchange cells with an opponent peg (Jack).
    Swap,
    /// Direct relocation to a track cell (Joker).
    Relocate,
}

/// A fully resolved move: the only unit [`apply_move`] accepts.
///
/// [`apply_move`]: crate::apply_move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// The peg being moved.
    pub peg: PegId,
    /// The flavor of the move.
    pub kind: MoveKind,
    /// The cell the peg starts on.
    pub from: PositionId,
    /// The cell the peg lands on.
    pub to: PositionId,
    /// The card paying for the move.
    pub card: CardId,
    /// An opponent peg captured at the landing cell.
    pub captures: Option<PegId>,
    /// An opponent peg exchanged into `from` (Jack only).
    pub swaps_with: Option<PegId>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates every legal move for one peg with one card.
///
/// Pure: no turn or phase checks here (that is [`validate_move`]'s job),
/// so UIs and tests can preview moves for any peg at any time. Unknown
/// pegs yield an empty list.
pub fn valid_moves(
    state: &GameState,
    peg_id: PegId,
    card: &Card,
) -> Vec<Move> {
    let Some(peg) = state.peg(peg_id).copied() else {
        return Vec::new();
    };
    let Some(pos) = state.board.position(peg.position) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    match pos.kind {
        PositionKind::Holding => {
            holding_exits(state, &peg, card, &mut out);
        }
        PositionKind::Center => {
            center_exits(state, &peg, card, &mut out);
        }
        PositionKind::Safe => {
            safe_zone_moves(state, &peg, card, &mut out);
        }
        PositionKind::FastTrack => {
            ring_moves(state, &peg, card, &mut out);
            backward_moves(state, &peg, card, &mut out);
            swap_moves(state, &peg, card, &mut out);
            relocate_moves(state, &peg, card, &mut out);
        }
        PositionKind::OuterRim => {
            if let Some(n) = card.rank.forward_steps() {
                let from = state
                    .board
                    .track_index(peg.position)
                    .expect("rim peg is on the track");
                forward_on_rim(state, &peg, card, from, n, &mut out);
            }
            backward_moves(state, &peg, card, &mut out);
            swap_moves(state, &peg, card, &mut out);
            relocate_moves(state, &peg, card, &mut out);
        }
        // Finished pegs never move again.
        PositionKind::Winner => {}
    }
    out
}

/// Can the mover land on `to`? `None` means blocked by an own peg;
/// otherwise the captured opponent, if any.
fn landing(
    state: &GameState,
    mover: &Peg,
    to: PositionId,
) -> Option<Option<PegId>> {
    match state.peg_at(to) {
        Some(p) if p.player == mover.player => None,
        Some(p) => Some(Some(p.id)),
        None => Some(None),
    }
}

/// Is one of the mover's own pegs (other than itself) on `cell`?
fn own_peg_on(
    state: &GameState,
    player: PlayerId,
    cell: PositionId,
    mover: PegId,
) -> bool {
    state
        .peg_at(cell)
        .is_some_and(|p| p.player == player && p.id != mover)
}

fn mv(
    peg: &Peg,
    card: &Card,
    kind: MoveKind,
    to: PositionId,
    captures: Option<PegId>,
) -> Move {
    Move {
        peg: peg.id,
        kind,
        from: peg.position,
        to,
        card: card.id,
        captures,
        swaps_with: None,
    }
}

fn holding_exits(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    if !card.rank.exits_holding() {
        return;
    }
    let entry = state
        .board
        .track_position(state.board.zone(peg.player).entry);
    if let Some(captures) = landing(state, peg, entry) {
        out.push(mv(peg, card, MoveKind::ExitHolding, entry, captures));
    }
}

fn center_exits(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    if !card.rank.exits_center() {
        return;
    }
    let hole = state
        .board
        .track_position(state.board.zone(peg.player).home_hole);
    if let Some(captures) = landing(state, peg, hole) {
        out.push(mv(peg, card, MoveKind::CenterExit, hole, captures));
    }
}

/// Forward travel along the track from index `from`, `n` steps.
///
/// Resolves the no-overtake rule: any count that would pass the player's
/// own entrance turns into the safe zone (or is dropped as an
/// overshoot); rim landings are only generated up to the entrance.
/// Own pegs block every traversed cell; opponents are passed freely and
/// captured only at the landing.
fn forward_on_rim(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    from: usize,
    n: usize,
    out: &mut Vec<Move>,
) {
    let board = &state.board;
    let d = board.steps_to_exit(from, peg.player);
    if n <= d {
        // Stays on the rim. Cells 1..n-1 are traversed, cell n is the
        // landing.
        let blocked = (1..n).any(|k| {
            own_peg_on(
                state,
                peg.player,
                board.track_position(board.forward(from, k)),
                peg.id,
            )
        });
        if blocked {
            return;
        }
        let to = board.track_position(board.forward(from, n));
        if let Some(captures) = landing(state, peg, to) {
            out.push(mv(peg, card, MoveKind::Forward, to, captures));
        }
    } else {
        // Crosses the entrance: the rim portion covers cells 1..=d.
        let blocked = (1..=d).any(|k| {
            own_peg_on(
                state,
                peg.player,
                board.track_position(board.forward(from, k)),
                peg.id,
            )
        });
        if !blocked {
            zone_landing(state, peg, card, n - d, out);
        }
    }
}

/// A landing `into` steps past the entrance: 1..=4 are safe slots,
/// 5 is the winner slot, beyond is an overshoot.
fn zone_landing(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    into: usize,
    out: &mut Vec<Move>,
) {
    let zone = state.board.zone(peg.player);
    if into <= SAFE_SLOTS {
        let slot = into - 1;
        if safe_slot_open(state, peg, slot) {
            out.push(mv(
                peg,
                card,
                MoveKind::SafeAdvance,
                zone.safe[slot],
                None,
            ));
        }
    } else if into == SAFE_SLOTS + 1
        && state.peg_at(zone.winner).is_none()
    {
        out.push(mv(peg, card, MoveKind::Finish, zone.winner, None));
    }
}

/// Safe slots fill in strict index order: slot `k` is open only when it
/// is empty and every lower slot holds another of the player's pegs.
/// A mover already sitting on a lower slot fails the check, so no move
/// can ever leave a hole behind it.
fn safe_slot_open(state: &GameState, peg: &Peg, slot: usize) -> bool {
    let zone = state.board.zone(peg.player);
    if state.peg_at(zone.safe[slot]).is_some() {
        return false;
    }
    (0..slot).all(|j| {
        state
            .peg_at(zone.safe[j])
            .is_some_and(|p| p.player == peg.player && p.id != peg.id)
    })
}

fn safe_zone_moves(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    // Forward only; the backward card never applies inside the zone.
    let Some(n) = card.rank.forward_steps() else {
        return;
    };
    let board = &state.board;
    let slot = board
        .safe_index(peg.position)
        .expect("safe peg is on a safe slot");
    let zone = board.zone(peg.player);
    let target = slot + n;
    if target < SAFE_SLOTS {
        if safe_slot_open(state, peg, target) {
            out.push(mv(
                peg,
                card,
                MoveKind::SafeAdvance,
                zone.safe[target],
                None,
            ));
        }
    } else if target == SAFE_SLOTS {
        // Exact landing on the winner slot, with no own peg between.
        let clear = (slot + 1..SAFE_SLOTS)
            .all(|j| state.peg_at(zone.safe[j]).is_none());
        if clear && state.peg_at(zone.winner).is_none() {
            out.push(mv(peg, card, MoveKind::Finish, zone.winner, None));
        }
    }
    // target > SAFE_SLOTS: overshoot, nothing generated.
}

/// Moves available to a peg standing on a fast-track hole.
fn ring_moves(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    let Some(n) = card.rank.forward_steps() else {
        return;
    };
    let board = &state.board;
    let here = board
        .fast_track_index(peg.position)
        .expect("ring peg is on a hole");
    let own = peg.player.seat();

    // Continue clockwise around the ring, one hole per step.
    ring_advance(state, peg, card, here, n, out);

    if here == own {
        // On the own home hole: exit onto the rim toward the safe zone,
        // or step into the center (exactly one forward step).
        forward_on_rim(
            state,
            peg,
            card,
            board.zone(peg.player).home_hole,
            n,
            out,
        );
        if n == 1 {
            let center = board.center();
            if let Some(captures) = landing(state, peg, center) {
                out.push(mv(
                    peg,
                    card,
                    MoveKind::CenterEnter,
                    center,
                    captures,
                ));
            }
        }
    } else {
        // The own hole lies k ring steps ahead; with steps to spare the
        // peg may exit there and spend the rest on the rim.
        let k = (own + SEATS - here) % SEATS;
        if k < n {
            let blocked = (1..=k).any(|s| {
                own_peg_on(
                    state,
                    peg.player,
                    board.track_position(board.hole_track_index(here + s)),
                    peg.id,
                )
            });
            if !blocked {
                forward_on_rim(
                    state,
                    peg,
                    card,
                    board.zone(peg.player).home_hole,
                    n - k,
                    out,
                );
            }
        }
    }
}

fn ring_advance(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    here: usize,
    n: usize,
    out: &mut Vec<Move>,
) {
    let board = &state.board;
    let blocked = (1..n).any(|k| {
        own_peg_on(
            state,
            peg.player,
            board.track_position(board.hole_track_index(here + k)),
            peg.id,
        )
    });
    if blocked {
        return;
    }
    let to = board.track_position(board.hole_track_index(here + n));
    if to == peg.position {
        // A full lap of the ring is a no-op, not a move.
        return;
    }
    if let Some(captures) = landing(state, peg, to) {
        out.push(mv(peg, card, MoveKind::RingAdvance, to, captures));
    }
}

/// The backward card: exactly four track cells backward, holes treated
/// as ordinary rim cells, no ring or center options.
fn backward_moves(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    if !card.rank.is_backward() {
        return;
    }
    let board = &state.board;
    let from = board
        .track_index(peg.position)
        .expect("track peg has a track index");
    let blocked = (1..4).any(|k| {
        own_peg_on(
            state,
            peg.player,
            board.track_position(board.backward(from, k)),
            peg.id,
        )
    });
    if blocked {
        return;
    }
    let to = board.track_position(board.backward(from, 4));
    if let Some(captures) = landing(state, peg, to) {
        out.push(mv(peg, card, MoveKind::Backward, to, captures));
    }
}

/// Jack: one swap per opponent peg on the track. Positions exchange,
/// nobody is captured.
fn swap_moves(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    if card.rank != Rank::Jack {
        return;
    }
    for other in state.pegs.values() {
        if other.player == peg.player
            || other.state != PegState::OnTrack
            || state.board.track_index(other.position).is_none()
        {
            continue;
        }
        out.push(Move {
            peg: peg.id,
            kind: MoveKind::Swap,
            from: peg.position,
            to: other.position,
            card: card.id,
            captures: None,
            swaps_with: Some(other.id),
        });
    }
}

/// Joker: one relocation per track cell not occupied by an own peg.
fn relocate_moves(
    state: &GameState,
    peg: &Peg,
    card: &Card,
    out: &mut Vec<Move>,
) {
    if card.rank != Rank::Joker {
        return;
    }
    for cell in state.board.track_cells() {
        if cell == peg.position {
            continue;
        }
        if let Some(captures) = landing(state, peg, cell) {
            out.push(mv(peg, card, MoveKind::Relocate, cell, captures));
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates an attempted move and resolves it to a concrete [`Move`].
///
/// Layers on top of [`valid_moves`]: the game must be in the playing
/// phase, `actor` must be the current player and own the peg, the card
/// must be in their hand, and while the actor has a peg riding the
/// fast-track ring that peg must be the one moved. With several legal
/// landings a `target` is required.
///
/// # Errors
/// A [`RuleViolation`] naming the first failed check; never fatal.
pub fn validate_move(
    state: &GameState,
    actor: PlayerId,
    peg_id: PegId,
    card_id: CardId,
    target: Option<PositionId>,
) -> Result<Move, RuleViolation> {
    if state.phase != GamePhase::Playing {
        return Err(RuleViolation::WrongPhase {
            required: GamePhase::Playing,
            actual: state.phase,
        });
    }
    let peg = state
        .peg(peg_id)
        .copied()
        .ok_or(RuleViolation::UnknownPeg(peg_id))?;
    if actor != state.current_player {
        return Err(RuleViolation::NotYourTurn(actor));
    }
    if peg.player != actor {
        return Err(RuleViolation::NotYourPeg {
            peg: peg_id,
            owner: peg.player,
        });
    }
    let card = *state
        .hand_card(actor, card_id)
        .ok_or(RuleViolation::CardNotInHand(card_id))?;
    if state.has_fast_track_peg(actor)
        && !state.board.is_fast_track(peg.position)
    {
        return Err(RuleViolation::FastTrackPriority);
    }

    let mut moves = valid_moves(state, peg_id, &card);
    if moves.is_empty() {
        return Err(RuleViolation::NoLegalMove(peg_id));
    }
    match target {
        Some(t) => moves
            .into_iter()
            .find(|m| m.to == t)
            .ok_or(RuleViolation::IllegalTarget {
                peg: peg_id,
                target: t,
            }),
        None => {
            if moves.len() == 1 {
                Ok(moves.remove(0))
            } else {
                Err(RuleViolation::AmbiguousMove {
                    candidates: moves.len(),
                })
            }
        }
    }
}
