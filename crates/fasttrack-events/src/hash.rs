//! Order-independent state digest for divergence detection.
//!
//! Two peers compare digests instead of shipping full states. The hash
//! covers exactly what the synchronization protocol needs to agree on:
//! the turn counter, whose turn it is, and where every peg stands.
//! `FxHasher` is seedless and platform-stable, so equal states digest
//! equally on every peer.

use std::hash::{Hash, Hasher};

use fasttrack_engine::GameState;
use rustc_hash::FxHasher;

/// Digests a state into a 64-bit fingerprint.
///
/// Order independence comes from the peg map's sorted iteration: the
/// (peg id, position) pairs enter the hasher in id order regardless of
/// how the state was produced.
pub fn state_hash(state: &GameState) -> u64 {
    let mut hasher = FxHasher::default();
    state.turn_number.hash(&mut hasher);
    state.current_player.0.hash(&mut hasher);
    for (id, peg) in &state.pegs {
        id.0.hash(&mut hasher);
        peg.position.0.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use fasttrack_engine::{GameConfig, PegId, init_game};

    use super::*;

    #[test]
    fn test_equal_states_hash_equal() {
        let a = init_game(&GameConfig::default()).unwrap();
        let b = init_game(&GameConfig::default()).unwrap();
        assert_eq!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn test_peg_position_changes_the_hash() {
        let a = init_game(&GameConfig::default()).unwrap();
        let mut b = a.clone();
        let cell = b.board.track_position(40);
        b.pegs.get_mut(&PegId(4)).unwrap().position = cell;
        assert_ne!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn test_turn_and_current_player_change_the_hash() {
        let a = init_game(&GameConfig::default()).unwrap();
        let mut b = a.clone();
        b.turn_number += 1;
        assert_ne!(state_hash(&a), state_hash(&b));

        let mut c = a.clone();
        c.current_player = fasttrack_engine::PlayerId(1);
        assert_ne!(state_hash(&a), state_hash(&c));
    }

    #[test]
    fn test_hand_contents_do_not_affect_the_hash() {
        // The digest covers peg placement and turn bookkeeping only;
        // private piles are deliberately outside it.
        let a = init_game(&GameConfig::default()).unwrap();
        let mut b = a.clone();
        b.players[0].deck.pop();
        assert_eq!(state_hash(&a), state_hash(&b));
    }
}
