//! Two peers on an in-memory mesh playing a scripted opening.
//!
//! Peer A seats player 0, peer B seats player 1. A announces the game,
//! both peers then drive their own turns; after every turn the demo
//! waits for the mesh to settle and checks that both state hashes agree.

use std::time::Duration;

use fasttrack::prelude::*;

/// First playable (card, move) for the player, scanning hand order.
fn pick_move(state: &GameState, player: PlayerId) -> Option<(CardId, Move)> {
    let seat = state.player(player)?;
    for card in &seat.hand {
        let pegs: Vec<PegId> =
            state.pegs_of(player).map(|p| p.id).collect();
        for peg in pegs {
            if let Some(mv) =
                valid_moves(state, peg, card).into_iter().next()
            {
                return Some((card.id, mv));
            }
        }
    }
    None
}

/// Waits until both peers hold the same history and the same hash.
async fn settle(a: &NodeHandle, b: &NodeHandle) -> Result<(), SyncError> {
    for _ in 0..200 {
        let same_len =
            a.event_log().await?.len() == b.event_log().await?.len();
        if same_len && a.state_hash().await? == b.state_hash().await? {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tracing::warn!("peers did not settle; continuing anyway");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = GameConfig {
        num_players: 2,
        seed: 42,
        ..GameConfig::default()
    };

    let mut mesh = memory_mesh(&[PeerId(1), PeerId(2)]);
    let (b_endpoint, b_inbound) = mesh.pop().expect("two endpoints");
    let (a_endpoint, a_inbound) = mesh.pop().expect("two endpoints");

    let a = spawn_node(
        SyncConfig::new(SessionId(7), PeerId(1), config.clone()),
        a_endpoint,
        a_inbound,
    )?;
    let b = spawn_node(
        SyncConfig::new(SessionId(7), PeerId(2), config.clone()),
        b_endpoint,
        b_inbound,
    )?;

    // Peer A announces the session; everything flows through events.
    a.dispatch(EventPayload::GameCreated {
        config: config.clone(),
    })
    .await?;
    a.dispatch(EventPayload::PlayerJoined {
        player: PlayerId(0),
        name: "North".into(),
        is_bot: false,
    })
    .await?;
    a.dispatch(EventPayload::PlayerJoined {
        player: PlayerId(1),
        name: "South".into(),
        is_bot: false,
    })
    .await?;
    a.dispatch(EventPayload::GameStarted).await?;
    settle(&a, &b).await?;

    for _ in 0..8 {
        let state = a.state().await?;
        if state.phase != GamePhase::Playing {
            break;
        }
        let current = state.current_player;
        // Each peer drives its own seat.
        let driver = if current == PlayerId(0) { &a } else { &b };
        let view = driver.state().await?;

        match pick_move(&view, current) {
            Some((card, mv)) => {
                driver
                    .dispatch(EventPayload::CardPlayed {
                        player: current,
                        card,
                    })
                    .await?;
                driver
                    .dispatch(EventPayload::PegMoved { mv })
                    .await?;
                println!(
                    "turn {}: {} plays {} -> {}",
                    view.turn_number, current, mv.peg, mv.to
                );
            }
            None => {
                println!(
                    "turn {}: {} has no legal move",
                    view.turn_number, current
                );
            }
        }
        driver
            .dispatch(EventPayload::TurnEnded {
                player: current,
                play_again: false,
            })
            .await?;
        settle(&a, &b).await?;
    }

    let hash_a = a.state_hash().await?;
    let hash_b = b.state_hash().await?;
    println!(
        "final: {} events, hashes {:#018x} / {:#018x} ({})",
        a.event_log().await?.len(),
        hash_a,
        hash_b,
        if hash_a == hash_b {
            "in sync"
        } else {
            "DIVERGED"
        }
    );

    a.disconnect().await;
    b.disconnect().await;
    Ok(())
}
