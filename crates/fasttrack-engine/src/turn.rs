//! Turn flow: joining, starting, playing cards, ending turns.
//!
//! Everything here clones the state and returns the successor, same as
//! the move engine. Draws and reshuffles advance the state's seeded RNG,
//! so they replay identically on every peer folding the same events.

use fasttrack_board::PlayerId;

use crate::{
    Card, CardId, GamePhase, GameState, GameRng, Player, RuleViolation,
};

fn require_phase(
    state: &GameState,
    required: GamePhase,
) -> Result<(), RuleViolation> {
    if state.phase != required {
        return Err(RuleViolation::WrongPhase {
            required,
            actual: state.phase,
        });
    }
    Ok(())
}

fn require_turn(
    state: &GameState,
    actor: PlayerId,
) -> Result<(), RuleViolation> {
    if actor != state.current_player {
        return Err(RuleViolation::NotYourTurn(actor));
    }
    Ok(())
}

/// Draws one card, reshuffling the discard pile into the deck first if
/// the deck ran dry. Returns `None` only when both piles are empty.
fn draw_one(player: &mut Player, rng: &mut GameRng) -> Option<Card> {
    if player.deck.is_empty() && !player.discard.is_empty() {
        player.deck.append(&mut player.discard);
        rng.shuffle(&mut player.deck);
        tracing::debug!(
            player = %player.id,
            cards = player.deck.len(),
            "discard pile reshuffled into deck"
        );
    }
    player.deck.pop()
}

/// Marks the game as announced: `Setup` becomes `Waiting`.
pub fn create_game(state: &GameState) -> Result<GameState, RuleViolation> {
    require_phase(state, GamePhase::Setup)?;
    let mut next = state.clone();
    next.phase = GamePhase::Waiting;
    Ok(next)
}

/// Records a peer claiming a seat. Idempotent per seat.
///
/// # Errors
/// [`RuleViolation::UnknownPlayer`] for a seat outside the game,
/// [`RuleViolation::WrongPhase`] once play started.
pub fn join_player(
    state: &GameState,
    player: PlayerId,
    name: &str,
    is_bot: bool,
) -> Result<GameState, RuleViolation> {
    if state.phase != GamePhase::Setup
        && state.phase != GamePhase::Waiting
    {
        return Err(RuleViolation::WrongPhase {
            required: GamePhase::Waiting,
            actual: state.phase,
        });
    }
    let mut next = state.clone();
    let seat = next
        .players
        .get_mut(player.seat())
        .ok_or(RuleViolation::UnknownPlayer(player))?;
    seat.joined = true;
    seat.name = name.to_string();
    seat.is_bot = is_bot;
    tracing::info!(%player, name, "player joined");
    Ok(next)
}

/// Records a peer abandoning a seat. Pegs stay on the board; another
/// peer (or a bot driver) may take the seat over.
pub fn leave_player(
    state: &GameState,
    player: PlayerId,
) -> Result<GameState, RuleViolation> {
    let mut next = state.clone();
    let seat = next
        .players
        .get_mut(player.seat())
        .ok_or(RuleViolation::UnknownPlayer(player))?;
    seat.joined = false;
    tracing::info!(%player, "player left");
    Ok(next)
}

/// Starts play: shuffles every deck with the shared seeded RNG, deals
/// each player up to the configured hand size, and hands the first turn
/// to seat 0.
pub fn start_game(state: &GameState) -> Result<GameState, RuleViolation> {
    if state.phase != GamePhase::Setup
        && state.phase != GamePhase::Waiting
    {
        return Err(RuleViolation::WrongPhase {
            required: GamePhase::Waiting,
            actual: state.phase,
        });
    }
    let mut next = state.clone();
    // Seat order matters: every peer must advance the RNG identically.
    for player in next.players.iter_mut() {
        next.rng.shuffle(&mut player.deck);
    }
    let hand_size = next.config.cards_per_hand;
    for player in next.players.iter_mut() {
        while player.hand.len() < hand_size {
            match draw_one(player, &mut next.rng) {
                Some(card) => player.hand.push(card),
                None => break,
            }
        }
    }
    next.phase = GamePhase::Playing;
    next.current_player = PlayerId(0);
    next.turn_number = 1;
    tracing::info!(
        players = next.players.len(),
        hand_size,
        "game started"
    );
    Ok(next)
}

/// Moves a card from the actor's hand to their discard pile and records
/// its rank for the end-of-turn replay check.
pub fn play_card(
    state: &GameState,
    actor: PlayerId,
    card: CardId,
) -> Result<GameState, RuleViolation> {
    require_phase(state, GamePhase::Playing)?;
    require_turn(state, actor)?;
    let mut next = state.clone();
    let seat = next
        .players
        .get_mut(actor.seat())
        .ok_or(RuleViolation::UnknownPlayer(actor))?;
    let idx = seat
        .hand
        .iter()
        .position(|c| c.id == card)
        .ok_or(RuleViolation::CardNotInHand(card))?;
    let played = seat.hand.remove(idx);
    seat.discard.push(played);
    next.last_played = Some(played.rank);
    next.must_play_again = false;
    tracing::debug!(%actor, card = %played.id, rank = ?played.rank, "card played");
    Ok(next)
}

/// Draws `count` cards into the player's hand, reshuffling as needed.
pub fn draw_cards(
    state: &GameState,
    player: PlayerId,
    count: usize,
) -> Result<GameState, RuleViolation> {
    let mut next = state.clone();
    let seat = next
        .players
        .get_mut(player.seat())
        .ok_or(RuleViolation::UnknownPlayer(player))?;
    for _ in 0..count {
        match draw_one(seat, &mut next.rng) {
            Some(card) => seat.hand.push(card),
            None => break,
        }
    }
    Ok(next)
}

/// Ends the actor's turn.
///
/// If the most recently played rank grants a replay and the caller opts
/// in, the actor keeps the turn (`must_play_again` is set). Otherwise
/// the hand is refilled to the configured size and the turn passes to
/// the next seat that has not finished.
pub fn end_turn(
    state: &GameState,
    actor: PlayerId,
    play_again: bool,
) -> Result<GameState, RuleViolation> {
    require_phase(state, GamePhase::Playing)?;
    require_turn(state, actor)?;
    let mut next = state.clone();

    if play_again
        && next.last_played.is_some_and(|r| r.grants_replay())
    {
        next.must_play_again = true;
        next.last_played = None;
        tracing::debug!(%actor, "extra turn granted");
        return Ok(next);
    }

    let hand_size = next.config.cards_per_hand;
    let seat = next
        .players
        .get_mut(actor.seat())
        .ok_or(RuleViolation::UnknownPlayer(actor))?;
    while seat.hand.len() < hand_size {
        match draw_one(seat, &mut next.rng) {
            Some(card) => seat.hand.push(card),
            None => break,
        }
    }
    next.must_play_again = false;
    next.last_played = None;
    next.current_player = next.next_active_player(actor);
    next.turn_number += 1;
    tracing::debug!(
        from = %actor,
        to = %next.current_player,
        turn = next.turn_number,
        "turn ended"
    );
    Ok(next)
}
