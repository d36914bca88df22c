//! Integration tests for event replay: determinism, idempotence, and
//! the reducer's totality guarantees.

use fasttrack_board::PlayerId;
use fasttrack_engine::{
    Card, CardId, GameConfig, GamePhase, PegId, Rank, Suit, init_game,
    valid_moves,
};
use fasttrack_events::{
    EventId, EventLog, EventPayload, GameEvent, PeerId, apply_event,
    rebuild, state_hash,
};

// =========================================================================
// Helpers
// =========================================================================

fn config(seed: u64) -> GameConfig {
    GameConfig {
        num_players: 2,
        seed,
        ..GameConfig::default()
    }
}

fn event(sequence: u64, payload: EventPayload) -> GameEvent {
    GameEvent {
        id: EventId(sequence * 31 + 1),
        sequence,
        timestamp: 1_000 + sequence,
        actor: PeerId(1),
        payload,
        checksum: None,
    }
}

/// A scripted opening: create, both players join, start, the starter
/// peg advances five cells, the turn passes.
fn opening(seed: u64) -> Vec<GameEvent> {
    let cfg = config(seed);
    let mut state = init_game(&cfg).unwrap();
    let mut events = Vec::new();
    let mut push = |state: &mut fasttrack_engine::GameState,
                    payload: EventPayload| {
        let ev = event(events.len() as u64 + 1, payload);
        *state = apply_event(state, &ev);
        events.push(ev);
    };

    push(
        &mut state,
        EventPayload::GameCreated { config: cfg.clone() },
    );
    push(
        &mut state,
        EventPayload::PlayerJoined {
            player: PlayerId(0),
            name: "Ada".into(),
            is_bot: false,
        },
    );
    push(
        &mut state,
        EventPayload::PlayerJoined {
            player: PlayerId(1),
            name: "Grace".into(),
            is_bot: false,
        },
    );
    push(&mut state, EventPayload::GameStarted);

    let five = Card {
        id: CardId(9000),
        rank: Rank::Five,
        suit: Some(Suit::Spades),
    };
    let mv = valid_moves(&state, PegId(4), &five)
        .into_iter()
        .next()
        .expect("the starter peg can advance");
    push(&mut state, EventPayload::PegMoved { mv });
    push(
        &mut state,
        EventPayload::TurnEnded {
            player: PlayerId(0),
            play_again: false,
        },
    );
    events
}

// =========================================================================
// Determinism
// =========================================================================

#[test]
fn test_replay_is_deterministic_for_a_fixed_seed_and_order() {
    let events = opening(42);
    let a = rebuild(&config(42), &events).unwrap();
    let b = rebuild(&config(42), &events).unwrap();
    assert_eq!(state_hash(&a), state_hash(&b));
    assert_eq!(a.phase, GamePhase::Playing);
    assert_eq!(a.current_player, PlayerId(1));
    assert_eq!(a.turn_number, 2);
    // The dealt hands replay identically too, not just the hash scope.
    assert_eq!(a.players[0].hand, b.players[0].hand);
    assert_eq!(a.players[1].deck, b.players[1].deck);
}

#[test]
fn test_incremental_fold_matches_full_rebuild() {
    let events = opening(7);
    let mut live = init_game(&config(7)).unwrap();
    for ev in &events {
        live = apply_event(&live, ev);
    }
    let replayed = rebuild(&config(7), &events).unwrap();
    assert_eq!(state_hash(&live), state_hash(&replayed));
}

#[test]
fn test_different_seeds_produce_different_deals() {
    let a = rebuild(&config(1), &opening(1)).unwrap();
    let b = rebuild(&config(2), &opening(2)).unwrap();
    assert_ne!(a.players[0].hand, b.players[0].hand);
}

// =========================================================================
// Totality
// =========================================================================

#[test]
fn test_unknown_events_are_no_ops() {
    let state = rebuild(&config(3), &opening(3)).unwrap();
    let before = state_hash(&state);
    let next =
        apply_event(&state, &event(99, EventPayload::Unknown));
    assert_eq!(state_hash(&next), before);
}

#[test]
fn test_transport_events_are_no_ops() {
    let state = rebuild(&config(3), &opening(3)).unwrap();
    let before = state_hash(&state);
    for payload in [
        EventPayload::Heartbeat { sent_at: 5 },
        EventPayload::SyncRequest { last_sequence: 2 },
        EventPayload::PegCaptured {
            peg: PegId(0),
            by: PegId(8),
        },
        EventPayload::PlayerFinished { player: PlayerId(0) },
    ] {
        let next = apply_event(&state, &event(99, payload));
        assert_eq!(state_hash(&next), before);
    }
}

#[test]
fn test_rejected_operations_leave_the_state_unchanged() {
    let events = opening(11);
    let state = rebuild(&config(11), &events).unwrap();
    let before = state_hash(&state);

    // Re-applying the already-applied move: the peg is no longer on
    // its `from` cell, so the rules reject it and the fold survives.
    let stale = events
        .iter()
        .find(|e| matches!(e.payload, EventPayload::PegMoved { .. }))
        .unwrap();
    let next = apply_event(&state, stale);
    assert_eq!(state_hash(&next), before);

    // A turn end from the wrong player is likewise rejected.
    let wrong_turn = event(
        99,
        EventPayload::TurnEnded {
            player: PlayerId(0),
            play_again: false,
        },
    );
    let next = apply_event(&state, &wrong_turn);
    assert_eq!(state_hash(&next), before);
}

// =========================================================================
// Log-derived state
// =========================================================================

#[test]
fn test_duplicate_append_changes_neither_log_nor_state() {
    let events = opening(5);
    let mut log = EventLog::new();
    for ev in &events {
        log.append(ev.clone()).unwrap();
    }
    let baseline =
        rebuild(&config(5), log.events()).map(|s| state_hash(&s));

    // Re-appending any historical event is rejected by id.
    let dup = events[2].clone();
    assert!(log.append(dup).is_err());
    assert_eq!(log.len(), events.len());
    let after =
        rebuild(&config(5), log.events()).map(|s| state_hash(&s));
    assert_eq!(baseline.unwrap(), after.unwrap());
}

#[test]
fn test_log_round_trip_preserves_the_derived_state() {
    let events = opening(9);
    let mut log = EventLog::new();
    for ev in &events {
        log.append(ev.clone()).unwrap();
    }
    let json = log.to_json().unwrap();
    let restored = EventLog::from_json(&json).unwrap();

    let a = rebuild(&config(9), log.events()).unwrap();
    let b = rebuild(&config(9), restored.events()).unwrap();
    assert_eq!(state_hash(&a), state_hash(&b));
    assert_eq!(restored.next_sequence(), log.next_sequence());
}
