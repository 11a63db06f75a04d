//! Player command handlers.

use crate::error::GameError;
use crate::protocol::{RoomSnapshot, ServerMessage};
use crate::state::AppState;
use crate::types::Player;
use std::sync::Arc;

pub async fn handle_join_room(
    state: &Arc<AppState>,
    room_id: &str,
    player: Option<Player>,
    is_host: bool,
    host_id: Option<String>,
) -> Option<ServerMessage> {
    // The host attaches to the room without entering the roster; an
    // unclaimed room picks up the host id.
    if is_host {
        let room = match state.get_room(room_id).await {
            Some(room) => match (room.host_id.is_none(), host_id) {
                (true, Some(host_id)) => state.claim_room(room_id, &host_id).await?,
                _ => room,
            },
            None => return Some(ServerMessage::error(GameError::RoomNotFound)),
        };
        return Some(ServerMessage::RoomState {
            room: RoomSnapshot::from(&room),
        });
    }

    let Some(player) = player else {
        return Some(ServerMessage::error(GameError::PlayerNotFound));
    };
    let room = match state.add_player(room_id, player).await {
        Ok(room) => room,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    let snapshot = RoomSnapshot::from(&room);
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::PlayersUpdate {
                players: snapshot.players.clone(),
            },
        )
        .await;
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::ChipsUpdate {
                chips: snapshot.chips.clone(),
            },
        )
        .await;
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::RoomUpdate {
                room: snapshot.clone(),
            },
        )
        .await;

    // The joiner subscribes only after this reply, so the snapshot is their
    // bootstrap state.
    Some(ServerMessage::RoomState { room: snapshot })
}

pub async fn handle_leave_room(
    state: &Arc<AppState>,
    room_id: &str,
    player_id: &str,
) -> Option<ServerMessage> {
    let removed = match state.remove_player(room_id, player_id).await {
        Ok(removed) => removed,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    if removed {
        if let Some(room) = state.get_room(room_id).await {
            let snapshot = RoomSnapshot::from(&room);
            state
                .broadcast_to_room(
                    room_id,
                    ServerMessage::PlayersUpdate {
                        players: snapshot.players.clone(),
                    },
                )
                .await;
            state
                .broadcast_to_room(room_id, ServerMessage::RoomUpdate { room: snapshot })
                .await;
        }
    }

    Some(ServerMessage::LeftRoom {
        room_id: room_id.to_string(),
    })
}

pub async fn handle_submit_answer(
    state: &Arc<AppState>,
    room_id: &str,
    player_id: &str,
    guess: f64,
) -> Option<ServerMessage> {
    let outcome = match state.submit_answer(room_id, player_id, guess).await {
        Ok(outcome) => outcome,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    state
        .broadcast_to_room(
            room_id,
            ServerMessage::AnswersUpdate {
                answered: outcome.answered,
            },
        )
        .await;

    // Last answer in: the room has rolled into the wager phase.
    if let Some(start) = outcome.wager_start {
        tracing::info!("All players answered in room {}, wagering begins", room_id);
        state
            .broadcast_to_room(
                room_id,
                ServerMessage::AnswersRevealed {
                    answer_tiles: start.answer_tiles,
                    zero_chip_players: start.zero_chip_players,
                    phase: crate::types::RoomPhase::Wager,
                },
            )
            .await;
        if let Some(room) = state.get_room(room_id).await {
            state
                .broadcast_to_room(
                    room_id,
                    ServerMessage::RoomUpdate {
                        room: RoomSnapshot::from(&room),
                    },
                )
                .await;
        }
    }
    None
}

pub async fn handle_place_bet(
    state: &Arc<AppState>,
    room_id: &str,
    player_id: &str,
    tile_index: usize,
    amount: u32,
) -> Option<ServerMessage> {
    match state.place_bet(room_id, player_id, tile_index, amount).await {
        Ok(update) => {
            state
                .broadcast_to_room(
                    room_id,
                    ServerMessage::BetsUpdate {
                        bets: update.bets,
                        chips: update.chips,
                    },
                )
                .await;
            None
        }
        Err(e) => Some(ServerMessage::error(e)),
    }
}

pub async fn handle_remove_bet(
    state: &Arc<AppState>,
    room_id: &str,
    player_id: &str,
    tile_index: usize,
) -> Option<ServerMessage> {
    match state.remove_bet(room_id, player_id, tile_index).await {
        Ok(update) => {
            state
                .broadcast_to_room(
                    room_id,
                    ServerMessage::BetsUpdate {
                        bets: update.bets,
                        chips: update.chips,
                    },
                )
                .await;
            None
        }
        Err(e) => Some(ServerMessage::error(e)),
    }
}

pub async fn handle_confirm_wagers(
    state: &Arc<AppState>,
    room_id: &str,
    player_id: &str,
) -> Option<ServerMessage> {
    let outcome = match state.confirm_wager(room_id, player_id).await {
        Ok(outcome) => outcome,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    state
        .broadcast_to_room(
            room_id,
            ServerMessage::WagersConfirmed {
                confirmed_count: outcome.confirmed_count,
                total_players: outcome.total_players,
                confirmed_wagers: outcome.confirmed,
            },
        )
        .await;

    // The last fresh confirmation settles the round.
    if outcome.all_confirmed && !outcome.already_confirmed {
        tracing::info!("All wagers confirmed in room {}, settling", room_id);
        if let Err(e) = settle_and_broadcast(state, room_id).await {
            tracing::warn!("Settlement in room {} failed: {}", room_id, e);
        }
    }
    None
}

pub async fn handle_request_room_state(
    state: &Arc<AppState>,
    room_id: &str,
) -> Option<ServerMessage> {
    match state.get_room(room_id).await {
        Some(room) => Some(ServerMessage::RoomState {
            room: RoomSnapshot::from(&room),
        }),
        None => Some(ServerMessage::error(GameError::RoomNotFound)),
    }
}

/// Settle the current round and fan the results out. Shared by the
/// all-confirmed trigger and the host's manual reveal.
pub(super) async fn settle_and_broadcast(
    state: &Arc<AppState>,
    room_id: &str,
) -> Result<(), GameError> {
    let result = state.settle_round(room_id).await?;
    let chips = result.chips.clone();

    state
        .broadcast_to_room(room_id, ServerMessage::PayoutResult { result })
        .await;
    state
        .broadcast_to_room(room_id, ServerMessage::ChipsUpdate { chips })
        .await;
    if let Some(room) = state.get_room(room_id).await {
        state
            .broadcast_to_room(
                room_id,
                ServerMessage::RoomUpdate {
                    room: RoomSnapshot::from(&room),
                },
            )
            .await;
    }
    Ok(())
}
