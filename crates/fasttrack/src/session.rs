//! A transport-free session for hot-seat play and tests.
//!
//! Wraps the same [`SyncCore`] the networked node uses, minus the mesh:
//! every dispatch is stamped, applied, and appended exactly as it would
//! be on a peer, so a local game's log can later seed a networked one.

use fasttrack_engine::{GameConfig, GameState};
use fasttrack_events::{EventPayload, GameEvent, PeerId, state_hash};
use fasttrack_sync::{SessionId, SyncConfig, SyncCore, SyncError};

/// The peer id a local session stamps on its events.
pub const LOCAL_PEER: PeerId = PeerId(0xFA57);

/// A single-process game session: one state, one log, no network.
pub struct LocalSession {
    core: SyncCore,
    clock: u64,
}

impl LocalSession {
    /// Creates a session over a fresh `init_game`.
    ///
    /// # Errors
    /// Configuration errors from the engine.
    pub fn new(config: GameConfig) -> Result<Self, SyncError> {
        let core = SyncCore::new(SyncConfig::new(
            SessionId(0),
            LOCAL_PEER,
            config,
        ))?;
        Ok(Self { core, clock: 0 })
    }

    /// Dispatches an event and returns it as stamped.
    ///
    /// Timestamps are a logical counter: a local session has no peers
    /// to agree with, only its own replayability to protect.
    ///
    /// # Errors
    /// Rules/log rejections, unchanged state.
    pub fn dispatch(
        &mut self,
        payload: EventPayload,
    ) -> Result<GameEvent, SyncError> {
        self.clock += 1;
        self.core.dispatch(payload, self.clock)
    }

    /// The live state.
    pub fn state(&self) -> &GameState {
        self.core.state()
    }

    /// The live state's digest.
    pub fn state_hash(&self) -> u64 {
        state_hash(self.core.state())
    }

    /// The session's history, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        self.core.log().events()
    }

    /// Replays the log from scratch and swaps the result in; returns
    /// the rebuilt hash.
    ///
    /// # Errors
    /// Configuration errors from the engine.
    pub fn rebuild_state(&mut self) -> Result<u64, SyncError> {
        self.core.rebuild_state()
    }
}

#[cfg(test)]
mod tests {
    use fasttrack_board::PlayerId;
    use fasttrack_engine::GamePhase;

    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            num_players: 2,
            seed: 42,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_local_session_plays_through_the_reducer() {
        let mut session = LocalSession::new(config()).unwrap();
        session
            .dispatch(EventPayload::GameCreated { config: config() })
            .unwrap();
        session
            .dispatch(EventPayload::PlayerJoined {
                player: PlayerId(0),
                name: "Ada".into(),
                is_bot: false,
            })
            .unwrap();
        session.dispatch(EventPayload::GameStarted).unwrap();

        assert_eq!(session.state().phase, GamePhase::Playing);
        assert_eq!(session.events().len(), 3);
        assert_eq!(session.state().players[0].hand.len(), 5);
    }

    #[test]
    fn test_rebuild_agrees_with_the_live_state() {
        let mut session = LocalSession::new(config()).unwrap();
        session
            .dispatch(EventPayload::GameCreated { config: config() })
            .unwrap();
        session.dispatch(EventPayload::GameStarted).unwrap();

        let live = session.state_hash();
        assert_eq!(session.rebuild_state().unwrap(), live);
    }

    #[test]
    fn test_transport_payloads_cannot_be_dispatched() {
        let mut session = LocalSession::new(config()).unwrap();
        assert!(
            session
                .dispatch(EventPayload::Heartbeat { sent_at: 1 })
                .is_err()
        );
    }
}
