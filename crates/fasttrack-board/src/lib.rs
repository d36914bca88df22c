//! Board topology for FastTrack.
//!
//! This crate builds the canonical, immutable position graph that every
//! other layer navigates:
//!
//! - **Ids** ([`PlayerId`], [`PositionId`]): the identities that travel
//!   on the wire inside moves and events.
//! - **Positions** ([`Position`], [`PositionKind`]): one record per cell
//!   on the board, immutable once built.
//! - **Board** ([`Board`], [`PlayerZone`]): the full graph plus the pure
//!   navigation helpers (circular track arithmetic, zone lookups,
//!   distance-to-exit).
//!
//! # Architecture
//!
//! The board is built once per process and shared by reference (an `Arc`
//! at the call sites). Nothing in here knows about pegs, cards, or turns;
//! the rules engine layers occupancy and legality on top.
//!
//! ```text
//! Board (cells, distances) → Engine (pegs, legality) → Events (history)
//! ```

mod board;
mod error;
mod position;

pub use board::{
    Board, PlayerZone, ENTRY_OFFSET, HOLDING_SLOTS, HOME_HOLE_OFFSET,
    RIM_LEN, SAFE_ENTRANCE_OFFSET, SAFE_SLOTS, SEATS, SECTION_LEN,
    TRACK_LEN,
};
pub use error::BoardError;
pub use position::{PlayerId, Position, PositionId, PositionKind};
