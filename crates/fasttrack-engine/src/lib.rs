//! Rules and move engine for FastTrack.
//!
//! Everything in this crate is pure: operations take a state (plus a
//! move, card, or player) and return a new state or a rejection. There
//! is no I/O, no clock, and no ambient randomness; the only RNG is the
//! seeded one inside [`GameState`], advanced exclusively by deck
//! shuffles so that folding the same operations from [`init_game`]
//! reproduces the same state on every peer.
//!
//! # Layers
//!
//! - **Data model** ([`Card`], [`Peg`], [`Player`], [`GameState`]):
//!   the snapshot types.
//! - **Move engine** ([`valid_moves`], [`validate_move`],
//!   [`apply_move`]): generation, validation, application.
//! - **Turn flow** ([`start_game`], [`play_card`], [`end_turn`], ...):
//!   the card/turn lifecycle around the moves.
//!
//! Rejected operations come back as [`RuleViolation`] values carrying a
//! reason; callers decide whether to retry with another move or drop
//! the attempt.

mod apply;
mod card;
mod error;
mod moves;
mod peg;
mod rng;
mod state;
mod turn;

pub use apply::apply_move;
pub use card::{
    Card, CardId, DECK_SIZE, Rank, SUITED_RANKS, SUITS, Suit,
    standard_deck,
};
pub use error::RuleViolation;
pub use moves::{Move, MoveKind, valid_moves, validate_move};
pub use peg::{Peg, PegId, PegState};
pub use rng::GameRng;
pub use state::{GameConfig, GamePhase, GameState, Player, init_game};
pub use turn::{
    create_game, draw_cards, end_turn, join_player, leave_player,
    play_card, start_game,
};

// Re-export the board vocabulary the engine API speaks.
pub use fasttrack_board::{Board, PlayerId, PositionId, PositionKind};
