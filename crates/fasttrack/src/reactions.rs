//! Cosmetic peg reactions: a pure projection over the event stream.
//!
//! Presentation layers subscribe to applied events and run them through
//! [`react`] to get taunts and celebrations. The projection reads
//! events and an assigned personality table and produces display
//! actions; by construction nothing here can reach back into move
//! legality or state transitions.

use std::collections::BTreeMap;

use fasttrack_board::PlayerId;
use fasttrack_events::{EventPayload, GameEvent};

/// A personality assigned to a player's pegs, for flavor only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Personality {
    /// Finds the bright side of everything.
    Cheerful,
    /// Takes every setback personally.
    Grumpy,
    /// Does not emote. Mostly.
    Stoic,
    /// Everything is the climax of a saga.
    Dramatic,
}

/// How a reaction should be staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    /// Big win energy.
    Celebrating,
    /// Rubbing it in.
    Taunting,
    /// Freshly captured.
    Sulking,
}

/// A presentation-only action derived from one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// The player whose pegs react.
    pub player: PlayerId,
    /// How to stage it.
    pub mood: Mood,
    /// What the peg says.
    pub line: String,
}

/// Projects one applied event into zero or more reactions.
///
/// Players absent from the personality table stay silent.
pub fn react(
    event: &GameEvent,
    personalities: &BTreeMap<PlayerId, Personality>,
) -> Vec<Reaction> {
    let mut out = Vec::new();
    match &event.payload {
        EventPayload::PegMoved { mv } => {
            if mv.captures.is_some() {
                // The capturing side gloats; the captured side is
                // announced separately via PegCaptured.
                let capturer = PlayerId(mv.peg.0 as u8 / 8);
                if let Some(&p) = personalities.get(&capturer) {
                    out.push(Reaction {
                        player: capturer,
                        mood: Mood::Taunting,
                        line: taunt_line(p),
                    });
                }
            }
        }
        EventPayload::PegCaptured { peg, .. } => {
            let victim = PlayerId(peg.0 as u8 / 8);
            if let Some(&p) = personalities.get(&victim) {
                out.push(Reaction {
                    player: victim,
                    mood: Mood::Sulking,
                    line: sulk_line(p),
                });
            }
        }
        EventPayload::PlayerFinished { player } => {
            if let Some(&p) = personalities.get(player) {
                out.push(Reaction {
                    player: *player,
                    mood: Mood::Celebrating,
                    line: celebrate_line(p),
                });
            }
        }
        _ => {}
    }
    out
}

fn taunt_line(p: Personality) -> String {
    match p {
        Personality::Cheerful => "Nothing personal!".into(),
        Personality::Grumpy => "You were in the way.".into(),
        Personality::Stoic => "...".into(),
        Personality::Dramatic => "DESTINY demanded it!".into(),
    }
}

fn sulk_line(p: Personality) -> String {
    match p {
        Personality::Cheerful => "I'll be back in no time!".into(),
        Personality::Grumpy => "Typical.".into(),
        Personality::Stoic => "Noted.".into(),
        Personality::Dramatic => "Betrayed! BETRAYED!".into(),
    }
}

fn celebrate_line(p: Personality) -> String {
    match p {
        Personality::Cheerful => "We did it, team!".into(),
        Personality::Grumpy => "Took long enough.".into(),
        Personality::Stoic => "Acceptable.".into(),
        Personality::Dramatic => "And thus the legend ends!".into(),
    }
}

#[cfg(test)]
mod tests {
    use fasttrack_engine::{
        CardId, Move, MoveKind, PegId, PositionId,
    };
    use fasttrack_events::{EventId, PeerId};

    use super::*;

    fn event(payload: EventPayload) -> GameEvent {
        GameEvent {
            id: EventId(1),
            sequence: 1,
            timestamp: 1,
            actor: PeerId(1),
            payload,
            checksum: None,
        }
    }

    fn table() -> BTreeMap<PlayerId, Personality> {
        BTreeMap::from([
            (PlayerId(0), Personality::Dramatic),
            (PlayerId(1), Personality::Grumpy),
        ])
    }

    #[test]
    fn test_capturing_move_produces_a_taunt() {
        let mv = Move {
            peg: PegId(4),
            kind: MoveKind::Forward,
            from: PositionId(10),
            to: PositionId(13),
            card: CardId(1),
            captures: Some(PegId(12)),
            swaps_with: None,
        };
        let reactions =
            react(&event(EventPayload::PegMoved { mv }), &table());
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].player, PlayerId(0));
        assert_eq!(reactions[0].mood, Mood::Taunting);
        assert_eq!(reactions[0].line, "DESTINY demanded it!");
    }

    #[test]
    fn test_capture_notification_makes_the_victim_sulk() {
        let reactions = react(
            &event(EventPayload::PegCaptured {
                peg: PegId(12),
                by: PegId(4),
            }),
            &table(),
        );
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].player, PlayerId(1));
        assert_eq!(reactions[0].mood, Mood::Sulking);
    }

    #[test]
    fn test_plain_moves_and_unassigned_players_stay_silent() {
        let mv = Move {
            peg: PegId(4),
            kind: MoveKind::Forward,
            from: PositionId(10),
            to: PositionId(13),
            card: CardId(1),
            captures: None,
            swaps_with: None,
        };
        assert!(
            react(&event(EventPayload::PegMoved { mv }), &table())
                .is_empty()
        );
        // Player 2 has no personality assigned.
        let finished = event(EventPayload::PlayerFinished {
            player: PlayerId(2),
        });
        assert!(react(&finished, &table()).is_empty());
    }

    #[test]
    fn test_finishing_celebrates_in_character() {
        let finished = event(EventPayload::PlayerFinished {
            player: PlayerId(1),
        });
        let reactions = react(&finished, &table());
        assert_eq!(reactions[0].mood, Mood::Celebrating);
        assert_eq!(reactions[0].line, "Took long enough.");
    }
}
