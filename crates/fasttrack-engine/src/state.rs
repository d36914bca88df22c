//! Game configuration, players, and the state snapshot.
//!
//! `GameState` is immutable by convention: operations clone it, edit the
//! clone, and return it. That keeps every state a pure fold of events
//! over [`init_game`], which is what the event log's rebuild and the
//! peers' divergence checks rely on.

use std::collections::BTreeMap;
use std::sync::Arc;

use fasttrack_board::{Board, PlayerId, PositionId, SEATS};
use serde::{Deserialize, Serialize};

use crate::{
    Card, CardId, DECK_SIZE, GameRng, Peg, PegId, PegState,
    RuleViolation, standard_deck,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The recognized game options. Shared verbatim by every peer of a
/// session; the seed in particular must match or replay diverges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seats in play, 2..=6.
    pub num_players: u8,
    /// Hand size each player is refilled to at end of turn.
    pub cards_per_hand: usize,
    /// Pegs per player, 1..=5. The last peg starts on the entry slot.
    pub pegs_per_player: usize,
    /// Mark non-host seats as bot-driven. The kernel stores the flag;
    /// driving bot seats is the caller's job.
    pub enable_bots: bool,
    /// Seed for every deterministic shuffle.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            cards_per_hand: 5,
            pegs_per_player: 5,
            enable_bots: false,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Checks every option against its allowed range.
    ///
    /// # Errors
    /// Returns [`RuleViolation::InvalidConfig`] naming the offending
    /// option.
    pub fn validate(&self) -> Result<(), RuleViolation> {
        if !(2..=SEATS as u8).contains(&self.num_players) {
            return Err(RuleViolation::InvalidConfig(format!(
                "num_players must be 2..=6, got {}",
                self.num_players
            )));
        }
        if self.cards_per_hand == 0
            || self.cards_per_hand > DECK_SIZE / 2
        {
            return Err(RuleViolation::InvalidConfig(format!(
                "cards_per_hand must be 1..={}, got {}",
                DECK_SIZE / 2,
                self.cards_per_hand
            )));
        }
        if !(1..=5).contains(&self.pegs_per_player) {
            return Err(RuleViolation::InvalidConfig(format!(
                "pegs_per_player must be 1..=5, got {}",
                self.pegs_per_player
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// One seated player and their private piles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// The player's seat.
    pub id: PlayerId,
    /// Display name; replaced when the owning peer announces itself.
    pub name: String,
    /// Whether this seat is bot-driven.
    pub is_bot: bool,
    /// Whether a peer has claimed this seat.
    pub joined: bool,
    /// Face-down draw pile, top of the deck at the back.
    pub deck: Vec<Card>,
    /// Cards currently held.
    pub hand: Vec<Card>,
    /// Face-up discard pile.
    pub discard: Vec<Card>,
}

// ---------------------------------------------------------------------------
// Phase and state
// ---------------------------------------------------------------------------

/// The game lifecycle phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Built but not yet announced.
    Setup,
    /// Announced, waiting for peers to claim seats.
    Waiting,
    /// Cards dealt, turns running.
    Playing,
    /// Every player has finished.
    GameOver,
}

/// A full snapshot of one game.
///
/// Cheap to clone for its size class: the board is shared by `Arc`, and
/// everything else is small. Cloned-and-replaced, never mutated in place
/// outside this crate's operations.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The immutable board, shared across every snapshot of the game.
    pub board: Arc<Board>,
    /// The configuration the game was created with.
    pub config: GameConfig,
    /// Seated players, indexed by seat.
    pub players: Vec<Player>,
    /// Every peg, keyed by id. A `BTreeMap` so iteration order is
    /// deterministic (the state hash depends on it).
    pub pegs: BTreeMap<PegId, Peg>,
    /// Whose turn it is.
    pub current_player: PlayerId,
    /// Monotonic turn counter; 0 until the game starts.
    pub turn_number: u64,
    /// Set when the current player earned an extra turn.
    pub must_play_again: bool,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// First player to finish, if any.
    pub winner: Option<PlayerId>,
    /// Players in finishing order. The winner is `rankings[0]`.
    pub rankings: Vec<PlayerId>,
    /// The rank most recently played this turn, if any. Read by
    /// end-of-turn replay checks.
    pub last_played: Option<crate::Rank>,
    /// The seeded RNG driving every shuffle.
    pub rng: GameRng,
}

/// Creates the initial state for a configuration.
///
/// Decks are built in order but not shuffled, and no cards are dealt:
/// shuffling and dealing happen on the game-started transition so every
/// peer advances the shared RNG at the same point of the event fold.
///
/// # Errors
/// Returns [`RuleViolation::InvalidConfig`] for an out-of-range
/// configuration.
pub fn init_game(config: &GameConfig) -> Result<GameState, RuleViolation> {
    config.validate()?;
    let board = Arc::new(Board::six_player().map_err(|e| {
        RuleViolation::InvalidConfig(format!("board: {e}"))
    })?);

    let mut players = Vec::with_capacity(config.num_players as usize);
    let mut pegs = BTreeMap::new();
    for seat in 0..config.num_players {
        let id = PlayerId(seat);
        players.push(Player {
            id,
            name: format!("Player {}", seat + 1),
            is_bot: config.enable_bots && seat != 0,
            joined: false,
            deck: standard_deck(seat as u16 * DECK_SIZE as u16),
            hand: Vec::new(),
            discard: Vec::new(),
        });

        // All pegs but the last start in the holding pen; the last one
        // starts on the entry slot.
        let zone = board.zone(id);
        for slot in 0..config.pegs_per_player - 1 {
            let peg_id = PegId::new(id, slot);
            pegs.insert(
                peg_id,
                Peg {
                    id: peg_id,
                    player: id,
                    position: zone.holding[slot],
                    state: PegState::InHolding,
                },
            );
        }
        let starter = PegId::new(id, config.pegs_per_player - 1);
        pegs.insert(
            starter,
            Peg {
                id: starter,
                player: id,
                position: board.track_position(zone.entry),
                state: PegState::OnTrack,
            },
        );
    }

    Ok(GameState {
        board,
        config: config.clone(),
        players,
        pegs,
        current_player: PlayerId(0),
        turn_number: 0,
        must_play_again: false,
        phase: GamePhase::Setup,
        winner: None,
        rankings: Vec::new(),
        last_played: None,
        rng: GameRng::new(config.seed),
    })
}

impl GameState {
    /// The player seated at `id`, if that seat is in play.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.seat())
    }

    /// The peg with the given id.
    pub fn peg(&self, id: PegId) -> Option<&Peg> {
        self.pegs.get(&id)
    }

    /// The peg standing on a cell, if any.
    pub fn peg_at(&self, position: PositionId) -> Option<&Peg> {
        self.pegs.values().find(|p| p.position == position)
    }

    /// All pegs belonging to one player.
    pub fn pegs_of(
        &self,
        player: PlayerId,
    ) -> impl Iterator<Item = &Peg> {
        self.pegs.values().filter(move |p| p.player == player)
    }

    /// Whether the player has already finished.
    pub fn has_finished(&self, player: PlayerId) -> bool {
        self.rankings.contains(&player)
    }

    /// The next seat after `from` that has not finished. Returns `from`
    /// itself if everyone else is done.
    pub fn next_active_player(&self, from: PlayerId) -> PlayerId {
        let n = self.players.len() as u8;
        for step in 1..=n {
            let candidate = PlayerId((from.0 + step) % n);
            if !self.has_finished(candidate) {
                return candidate;
            }
        }
        from
    }

    /// Looks up a card in a player's hand.
    pub fn hand_card(
        &self,
        player: PlayerId,
        card: CardId,
    ) -> Option<&Card> {
        self.player(player)?.hand.iter().find(|c| c.id == card)
    }

    /// Whether the player has any peg riding the fast-track ring.
    pub fn has_fast_track_peg(&self, player: PlayerId) -> bool {
        self.pegs_of(player)
            .any(|p| self.board.is_fast_track(p.position))
    }
}
