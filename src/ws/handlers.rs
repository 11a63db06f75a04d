//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Authorization is checked here, then dispatched to role-specific handler
//! modules. Direct replies go back to the requesting connection only; room
//! fan-out happens through the room's broadcast channel inside the
//! handlers.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::Role;
use std::sync::Arc;

use super::{host, player};

/// Macro to check host authorization and return early if unauthorized
macro_rules! check_host {
    ($role:expr, $action:expr) => {
        if *$role != Role::Host {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only host can {}", $action),
            });
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Host-only commands (authorization checked before dispatch)
        ClientMessage::CreateRoom { room_id, host_id } => {
            check_host!(role, "create rooms");
            host::handle_create_room(state, &room_id, &host_id).await
        }

        ClientMessage::DeleteRoom { room_id, host_id } => {
            check_host!(role, "delete rooms");
            host::handle_delete_room(state, &room_id, &host_id).await
        }

        ClientMessage::StartGame {
            room_id,
            categories,
        } => {
            check_host!(role, "start the game");
            host::handle_start_game(state, &room_id, categories).await
        }

        ClientMessage::NextRound { room_id } => {
            check_host!(role, "advance rounds");
            host::handle_next_round(state, &room_id).await
        }

        ClientMessage::RevealAnswer { room_id } => {
            check_host!(role, "reveal the answer");
            host::handle_reveal_answer(state, &room_id).await
        }

        ClientMessage::SetPhase { room_id, phase } => {
            check_host!(role, "override the phase");
            host::handle_set_phase(state, &room_id, phase).await
        }

        ClientMessage::UpdateCategories {
            room_id,
            categories,
        } => {
            check_host!(role, "update categories");
            host::handle_update_categories(state, &room_id, categories).await
        }

        // Player messages
        ClientMessage::JoinRoom {
            room_id,
            player,
            is_host,
            host_id,
        } => player::handle_join_room(state, &room_id, player, is_host, host_id).await,

        ClientMessage::LeaveRoom { room_id, player_id } => {
            player::handle_leave_room(state, &room_id, &player_id).await
        }

        ClientMessage::SubmitAnswer {
            room_id,
            player_id,
            guess,
        } => player::handle_submit_answer(state, &room_id, &player_id, guess).await,

        ClientMessage::PlaceBet {
            room_id,
            player_id,
            tile_index,
            amount,
        } => player::handle_place_bet(state, &room_id, &player_id, tile_index, amount).await,

        ClientMessage::RemoveBet {
            room_id,
            player_id,
            tile_index,
        } => player::handle_remove_bet(state, &room_id, &player_id, tile_index).await,

        ClientMessage::ConfirmWagers { room_id, player_id } => {
            player::handle_confirm_wagers(state, &room_id, &player_id).await
        }

        ClientMessage::RequestRoomState { room_id } => {
            player::handle_request_room_state(state, &room_id).await
        }
    }
}
