//! Roster management: joining and leaving a room.

use super::AppState;
use crate::error::GameError;
use crate::types::*;

impl AppState {
    /// Add a player to a room, or refresh them if they are rejoining.
    ///
    /// Idempotent by player id: a rejoin updates display fields and keeps
    /// the existing chip balance. New joins are only accepted in the lobby
    /// and up to the player cap; the starting stake is granted once.
    pub async fn add_player(&self, room_id: &str, player: Player) -> Result<Room, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;

        if let Some(existing) = room.players.iter_mut().find(|p| p.id == player.id) {
            *existing = player.clone();
            // A pre-game join may predate chip initialization.
            room.chips.entry(player.id.clone()).or_insert(STARTING_CHIPS);
            tracing::info!("Player {} rejoined room {}", player.id, room_id);
        } else {
            if room.phase != RoomPhase::Lobby {
                return Err(GameError::GameAlreadyStarted);
            }
            if room.players.len() >= MAX_PLAYERS {
                return Err(GameError::PlayerLimitExceeded);
            }
            room.chips.insert(player.id.clone(), STARTING_CHIPS);
            tracing::info!(
                "Player {} ({}) joined room {} ({}/{})",
                player.id,
                player.name,
                room_id,
                room.players.len() + 1,
                MAX_PLAYERS
            );
            room.players.push(player);
        }

        Ok(room.clone())
    }

    /// Remove a player and prune everything they own in the current round:
    /// chip entries, answers, confirmation, and their outstanding bets
    /// (voided, so they can no longer win a settlement). Returns whether a
    /// removal happened.
    pub async fn remove_player(&self, room_id: &str, player_id: &str) -> Result<bool, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;

        let Some(pos) = room.players.iter().position(|p| p.id == player_id) else {
            return Ok(false);
        };

        room.players.remove(pos);
        room.chips.remove(player_id);
        room.chips_at_wager_start.remove(player_id);
        room.answers.retain(|a| a.player_id != player_id);
        room.bets.retain(|b| b.player_id != player_id);
        room.confirmed_wagers.remove(player_id);

        tracing::info!(
            "Player {} left room {} ({} remaining)",
            player_id,
            room_id,
            room.players.len()
        );
        Ok(true)
    }
}
