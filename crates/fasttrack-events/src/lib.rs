//! Event sourcing for FastTrack.
//!
//! This crate is the session's memory and its wire format:
//!
//! - **Schema** ([`GameEvent`], [`EventPayload`], [`EventId`],
//!   [`PeerId`]): the closed, versioned event set peers exchange.
//! - **Log** ([`EventLog`]): append-only history with duplicate
//!   suppression, range queries, subscribers, and serialization.
//! - **Reducer** ([`apply_event`], [`rebuild`]): the total fold that
//!   turns history into state.
//! - **Digest** ([`state_hash`]): the fingerprint peers compare to
//!   detect divergence without shipping state.
//!
//! # Architecture
//!
//! ```text
//! Engine (pure rules) → Events (history, replay) → Sync (gossip)
//! ```
//!
//! Every state is a pure fold of events over
//! [`init_game`](fasttrack_engine::init_game); the reducer dispatches
//! each event to the engine and nothing else mutates state.

mod error;
mod event;
mod hash;
mod log;
mod reducer;

pub use error::EventError;
pub use event::{EventId, EventPayload, GameEvent, PeerId};
pub use hash::state_hash;
pub use log::{EventLog, Subscriber};
pub use reducer::{apply_event, rebuild};
