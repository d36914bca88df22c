//! Error types for the rules engine.
//!
//! A [`RuleViolation`] is a rejected operation, not a failure: the caller
//! (UI, bot driver, or test) reads the reason and decides whether to pick
//! another move or discard the attempt. Nothing here is fatal.

use fasttrack_board::PositionId;

use crate::{CardId, GamePhase, PegId, PlayerId};

/// Why a move, card play, or turn operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// The game configuration is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The operation is not available in the current phase.
    #[error("operation requires phase {required:?}, game is in {actual:?}")]
    WrongPhase {
        /// Phase the operation needs.
        required: GamePhase,
        /// Phase the game is in.
        actual: GamePhase,
    },

    /// No peg with that id exists.
    #[error("unknown peg {0}")]
    UnknownPeg(PegId),

    /// No seat exists for that player in this game.
    #[error("no seat for player {0}")]
    UnknownPlayer(PlayerId),

    /// The acting player is not the current player.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The peg belongs to someone else.
    #[error("peg {peg} belongs to {owner}")]
    NotYourPeg {
        /// The peg that was named.
        peg: PegId,
        /// Its actual owner.
        owner: PlayerId,
    },

    /// The named card is not in the acting player's hand.
    #[error("card {0} is not in hand")]
    CardNotInHand(CardId),

    /// While a player has a peg riding the fast-track ring, that peg
    /// must be moved before any other.
    #[error("a fast-track peg must be moved first")]
    FastTrackPriority,

    /// The card produces no legal move for this peg.
    #[error("no legal move for peg {0} with that card")]
    NoLegalMove(PegId),

    /// The requested landing is not among the legal moves.
    #[error("target {target} is not a legal landing for peg {peg}")]
    IllegalTarget {
        /// The peg being moved.
        peg: PegId,
        /// The requested landing cell.
        target: PositionId,
    },

    /// More than one legal landing exists and no target was given.
    #[error("{candidates} legal landings exist, a target is required")]
    AmbiguousMove {
        /// How many landings were generated.
        candidates: usize,
    },

    /// The move was built against a different state snapshot.
    #[error("move does not match the current state")]
    StaleMove,

    /// A captured peg's owner has no empty holding slot. Cannot happen
    /// while peg counts respect the configuration; kept as an error so
    /// corrupted event streams fail loudly instead of overwriting a peg.
    #[error("no empty holding slot for captured peg {0}")]
    HoldingFull(PegId),
}
