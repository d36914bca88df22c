//! The deterministic reducer: a total `apply_event`.
//!
//! Totality is the contract that keeps replay safe: whatever arrives,
//! the reducer returns a state. Recognized payloads dispatch to the
//! rules engine; operations the engine rejects are logged and leave the
//! state untouched; derived notifications, transport chatter, and
//! unknown payloads are no-ops.

use fasttrack_engine::{
    GameConfig, GamePhase, GameState, RuleViolation, apply_move,
    create_game, draw_cards, end_turn, init_game, join_player,
    leave_player, play_card, start_game,
};

use crate::{EventPayload, GameEvent};

/// Applies one event to a state, returning the successor.
///
/// Total: never fails. An event the rules engine rejects produces a
/// `warn` log and an unchanged state; this is how a peer survives a
/// buggy or stale remote without corrupting its own history.
pub fn apply_event(state: &GameState, event: &GameEvent) -> GameState {
    let outcome: Result<GameState, RuleViolation> = match &event.payload
    {
        // The state was already built from the same config by
        // `init_game`; the event just advances the phase. The config is
        // carried for late joiners who bootstrap from the log alone.
        EventPayload::GameCreated { .. } => create_game(state),
        EventPayload::PlayerJoined {
            player,
            name,
            is_bot,
        } => join_player(state, *player, name, *is_bot),
        EventPayload::PlayerLeft { player } => {
            leave_player(state, *player)
        }
        EventPayload::GameStarted => start_game(state),
        EventPayload::CardDrawn { player, count } => {
            draw_cards(state, *player, *count)
        }
        EventPayload::CardPlayed { player, card } => {
            play_card(state, *player, *card)
        }
        EventPayload::PegMoved { mv } => apply_move(state, mv),
        EventPayload::TurnEnded { player, play_again } => {
            end_turn(state, *player, *play_again)
        }
        EventPayload::GameEnded => {
            let mut next = state.clone();
            next.phase = GamePhase::GameOver;
            Ok(next)
        }
        // Derived notifications: the authoritative transition already
        // happened inside PegMoved/TurnEnded.
        EventPayload::PegCaptured { .. }
        | EventPayload::PlayAgain { .. }
        | EventPayload::PlayerFinished { .. } => return state.clone(),
        // Transport chatter and forward-compatibility.
        EventPayload::SyncRequest { .. }
        | EventPayload::SyncResponse { .. }
        | EventPayload::Heartbeat { .. }
        | EventPayload::Unknown => return state.clone(),
    };

    match outcome {
        Ok(next) => next,
        Err(violation) => {
            tracing::warn!(
                event = %event.id,
                sequence = event.sequence,
                %violation,
                "event rejected by the rules, state unchanged"
            );
            state.clone()
        }
    }
}

/// Replays a full history over a fresh `init_game`.
///
/// The foundation of determinism checks and of `rebuild_state` on the
/// host API: the result must hash-match any live state that folded the
/// same events.
///
/// # Errors
/// Only configuration errors from `init_game`; replay itself is total.
pub fn rebuild(
    config: &GameConfig,
    events: &[GameEvent],
) -> Result<GameState, RuleViolation> {
    let mut state = init_game(config)?;
    for event in events {
        state = apply_event(&state, event);
    }
    Ok(state)
}
