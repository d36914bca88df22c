//! Cards, ranks, and deck building.
//!
//! Every player owns a private 54-card deck (52 suited cards plus two
//! jokers). What a rank *does* is a property of the rank itself; the
//! tables below are the single source of truth the move generator reads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for one physical card.
///
/// Ids are dense per deck: player `p`'s deck occupies
/// `p * DECK_SIZE .. (p + 1) * DECK_SIZE`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

/// Card suits. Jokers carry no suit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Suit {
    /// Hearts.
    Hearts,
    /// Diamonds.
    Diamonds,
    /// Clubs.
    Clubs,
    /// Spades.
    Spades,
}

/// All four suits, in deck-building order.
pub const SUITS: [Suit; 4] =
    [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

/// Cards per player deck: 13 ranks x 4 suits + 2 jokers.
pub const DECK_SIZE: usize = 54;

/// The closed set of ranks.
///
/// Rank semantics (what the move generator reads):
///
/// | rank   | forward | special                                   |
/// |--------|---------|-------------------------------------------|
/// | A      | 1       | exits holding, enters center, play again  |
/// | 2..3   | face    |                                           |
/// | 4      | none    | exactly 4 steps backward                  |
/// | 5      | face    |                                           |
/// | 6      | face    | exits holding, play again                 |
/// | 7..10  | face    |                                           |
/// | J      | none    | swap with an opponent track peg; exits    |
/// |        |         | center; play again                        |
/// | Q      | 12      | exits center, play again                  |
/// | K      | 13      | exits holding, exits center, play again   |
/// | Joker  | none    | exits holding, relocate anywhere on the   |
/// |        |         | track; play again                         |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Rank {
    /// Ace.
    Ace,
    /// Two.
    Two,
    /// Three.
    Three,
    /// Four (the backward card).
    Four,
    /// Five.
    Five,
    /// Six.
    Six,
    /// Seven.
    Seven,
    /// Eight.
    Eight,
    /// Nine.
    Nine,
    /// Ten.
    Ten,
    /// Jack.
    Jack,
    /// Queen.
    Queen,
    /// King.
    King,
    /// Joker.
    Joker,
}

/// The thirteen suited ranks, in deck-building order.
pub const SUITED_RANKS: [Rank; 13] = [
    Rank::Ace,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
];

impl Rank {
    /// Forward travel distance on the track, if the rank moves forward.
    ///
    /// `None` for the backward card (4) and the cards whose only effect
    /// is a special action (Jack, Joker).
    pub fn forward_steps(self) -> Option<usize> {
        match self {
            Rank::Ace => Some(1),
            Rank::Two => Some(2),
            Rank::Three => Some(3),
            Rank::Four => None,
            Rank::Five => Some(5),
            Rank::Six => Some(6),
            Rank::Seven => Some(7),
            Rank::Eight => Some(8),
            Rank::Nine => Some(9),
            Rank::Ten => Some(10),
            Rank::Jack => None,
            Rank::Queen => Some(12),
            Rank::King => Some(13),
            Rank::Joker => None,
        }
    }

    /// Does this rank move exactly four steps backward?
    pub fn is_backward(self) -> bool {
        self == Rank::Four
    }

    /// May this rank bring a peg out of the holding pen?
    pub fn exits_holding(self) -> bool {
        matches!(
            self,
            Rank::Ace | Rank::Six | Rank::King | Rank::Joker
        )
    }

    /// May this rank bring a peg out of the center?
    pub fn exits_center(self) -> bool {
        matches!(self, Rank::Jack | Rank::Queen | Rank::King)
    }

    /// Does playing this rank grant an extra turn (if the player opts in)?
    pub fn grants_replay(self) -> bool {
        matches!(
            self,
            Rank::Ace
                | Rank::Six
                | Rank::Jack
                | Rank::Queen
                | Rank::King
                | Rank::Joker
        )
    }
}

/// One physical card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique id within the game.
    pub id: CardId,
    /// The card's rank.
    pub rank: Rank,
    /// The card's suit; `None` for jokers.
    pub suit: Option<Suit>,
}

/// Builds one ordered (unshuffled) 54-card deck starting at `first_id`.
///
/// Shuffling happens at game start via the state's seeded RNG so every
/// peer derives the same order.
pub fn standard_deck(first_id: u16) -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut id = first_id;
    for suit in SUITS {
        for rank in SUITED_RANKS {
            deck.push(Card {
                id: CardId(id),
                rank,
                suit: Some(suit),
            });
            id += 1;
        }
    }
    for _ in 0..2 {
        deck.push(Card {
            id: CardId(id),
            rank: Rank::Joker,
            suit: None,
        });
        id += 1;
    }
    deck
}
