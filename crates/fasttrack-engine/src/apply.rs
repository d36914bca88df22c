//! Applying a resolved move to a state.

use fasttrack_board::PlayerId;

use crate::{
    GamePhase, GameState, Move, PegState, RuleViolation,
};

/// Applies a resolved [`Move`], returning the successor state.
///
/// The input state is never touched: captures relocate the captured peg
/// to its owner's lowest-index empty holding slot, swaps exchange the
/// two cells, the mover's position and coarse state follow the landing
/// cell, and the mover's player is checked for a finish.
///
/// # Errors
/// [`RuleViolation::StaleMove`] when the move was generated against a
/// different snapshot; peg lookups that fail the same way. Legality is
/// [`validate_move`](crate::validate_move)'s job, not this function's.
pub fn apply_move(
    state: &GameState,
    mv: &Move,
) -> Result<GameState, RuleViolation> {
    let mut next = state.clone();

    let mover = *next
        .pegs
        .get(&mv.peg)
        .ok_or(RuleViolation::UnknownPeg(mv.peg))?;
    if mover.position != mv.from {
        return Err(RuleViolation::StaleMove);
    }

    if let Some(captured_id) = mv.captures {
        let captured = *next
            .pegs
            .get(&captured_id)
            .ok_or(RuleViolation::UnknownPeg(captured_id))?;
        let home = next
            .board
            .zone(captured.player)
            .holding
            .iter()
            .copied()
            .find(|&cell| next.peg_at(cell).is_none())
            .ok_or(RuleViolation::HoldingFull(captured_id))?;
        let entry = next
            .pegs
            .get_mut(&captured_id)
            .expect("captured peg exists");
        entry.position = home;
        entry.state = PegState::InHolding;
        tracing::debug!(
            peg = %captured_id,
            by = %mv.peg,
            "peg captured, sent to holding"
        );
    }

    if let Some(other_id) = mv.swaps_with {
        let other = next
            .pegs
            .get_mut(&other_id)
            .ok_or(RuleViolation::UnknownPeg(other_id))?;
        other.position = mv.from;
    }

    let landing_kind = next
        .board
        .position(mv.to)
        .ok_or(RuleViolation::StaleMove)?
        .kind;
    {
        let entry =
            next.pegs.get_mut(&mv.peg).expect("mover exists");
        entry.position = mv.to;
        entry.state = PegState::from_kind(landing_kind);
    }

    evaluate_finish(&mut next, mover.player);
    Ok(next)
}

/// Appends the player to the rankings the instant they satisfy the win
/// condition: all but one peg in the safe zone and one finished. The
/// first satisfier becomes the winner; the phase flips to game over
/// once every seat has finished.
fn evaluate_finish(state: &mut GameState, player: PlayerId) {
    if state.has_finished(player) {
        return;
    }
    let in_safe = state
        .pegs_of(player)
        .filter(|p| p.state == PegState::InSafe)
        .count();
    let finished = state
        .pegs_of(player)
        .filter(|p| p.state == PegState::Finished)
        .count();
    if in_safe == state.config.pegs_per_player - 1 && finished == 1 {
        state.rankings.push(player);
        if state.winner.is_none() {
            state.winner = Some(player);
        }
        tracing::info!(
            %player,
            place = state.rankings.len(),
            "player finished"
        );
        if state.rankings.len() == state.players.len() {
            state.phase = GamePhase::GameOver;
            tracing::info!("all players finished, game over");
        }
    }
}
