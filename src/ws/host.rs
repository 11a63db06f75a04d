//! Host-only command handlers
//!
//! All handlers in this module require the Host role; authorization is
//! checked in the dispatch layer before they are called.

use crate::error::GameError;
use crate::protocol::{RoomSnapshot, ServerMessage};
use crate::state::{AppState, RoundAdvance};
use crate::types::RoomPhase;
use std::sync::Arc;

pub async fn handle_create_room(
    state: &Arc<AppState>,
    room_id: &str,
    host_id: &str,
) -> Option<ServerMessage> {
    let room = match state.create_room(room_id, host_id).await {
        Ok(room) => room,
        // A live id means the host refreshed: re-claim instead of failing.
        Err(GameError::RoomAlreadyExists) => match state.claim_room(room_id, host_id).await {
            Some(room) => room,
            None => return Some(ServerMessage::error(GameError::RoomNotFound)),
        },
        Err(e) => return Some(ServerMessage::error(e)),
    };

    let snapshot = RoomSnapshot::from(&room);
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::RoomUpdate {
                room: snapshot.clone(),
            },
        )
        .await;
    Some(ServerMessage::RoomCreated { room: snapshot })
}

pub async fn handle_delete_room(
    state: &Arc<AppState>,
    room_id: &str,
    host_id: &str,
) -> Option<ServerMessage> {
    let room = match state.get_room(room_id).await {
        Some(room) => room,
        None => return Some(ServerMessage::error(GameError::RoomNotFound)),
    };
    if room.host_id.as_deref() != Some(host_id) {
        tracing::warn!("{} tried to delete room {} without owning it", host_id, room_id);
        return Some(ServerMessage::error(GameError::Unauthorized));
    }

    // Tell the room before the channel goes away with it.
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::RoomDeleted {
                room_id: room_id.to_string(),
            },
        )
        .await;
    state.delete_room(room_id).await;

    Some(ServerMessage::RoomDeleted {
        room_id: room_id.to_string(),
    })
}

pub async fn handle_start_game(
    state: &Arc<AppState>,
    room_id: &str,
    categories: Vec<String>,
) -> Option<ServerMessage> {
    let room = match state.start_game(room_id, categories).await {
        Ok(room) => room,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    let question = room.current_question.as_ref()?;
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::GameStarted {
                round: room.current_round,
                total_rounds: room.total_rounds,
                question: question.into(),
                chips: room.chips.clone(),
            },
        )
        .await;
    state
        .broadcast_to_room(
            room_id,
            ServerMessage::RoomUpdate {
                room: RoomSnapshot::from(&room),
            },
        )
        .await;
    None
}

pub async fn handle_next_round(state: &Arc<AppState>, room_id: &str) -> Option<ServerMessage> {
    let advance = match state.next_round(room_id).await {
        Ok(advance) => advance,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    match advance {
        RoundAdvance::Next { round, question } => {
            state
                .broadcast_to_room(
                    room_id,
                    ServerMessage::RoundAdvanced {
                        phase: RoomPhase::Question,
                        round,
                        question: (&question).into(),
                    },
                )
                .await;
        }
        RoundAdvance::Finished { leaderboard } => {
            state
                .broadcast_to_room(room_id, ServerMessage::GameFinished { leaderboard })
                .await;
        }
    }

    if let Some(room) = state.get_room(room_id).await {
        state
            .broadcast_to_room(
                room_id,
                ServerMessage::ChipsUpdate {
                    chips: room.chips.clone(),
                },
            )
            .await;
        state
            .broadcast_to_room(
                room_id,
                ServerMessage::RoomUpdate {
                    room: RoomSnapshot::from(&room),
                },
            )
            .await;
    }
    None
}

/// Manual settlement trigger, the fallback when the host wants to move on
/// before every player has confirmed.
pub async fn handle_reveal_answer(state: &Arc<AppState>, room_id: &str) -> Option<ServerMessage> {
    match super::player::settle_and_broadcast(state, room_id).await {
        Ok(()) => None,
        Err(e) => Some(ServerMessage::error(e)),
    }
}

pub async fn handle_set_phase(
    state: &Arc<AppState>,
    room_id: &str,
    phase: RoomPhase,
) -> Option<ServerMessage> {
    let phase = match state.set_phase(room_id, phase).await {
        Ok(phase) => phase,
        Err(e) => return Some(ServerMessage::error(e)),
    };

    state
        .broadcast_to_room(room_id, ServerMessage::PhaseChanged { phase })
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
    None
}

pub async fn handle_update_categories(
    state: &Arc<AppState>,
    room_id: &str,
    categories: Vec<String>,
) -> Option<ServerMessage> {
    match state.update_categories(room_id, categories).await {
        Ok(categories) => {
            state
                .broadcast_to_room(room_id, ServerMessage::CategoriesUpdate { categories })
                .await;
            None
        }
        Err(e) => Some(ServerMessage::error(e)),
    }
}
