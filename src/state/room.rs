//! Room store: creation, lookup, deletion, lobby settings.

use super::AppState;
use crate::error::GameError;
use crate::types::*;

impl AppState {
    /// Create a fresh room in lobby phase with its broadcast channel.
    pub async fn create_room(&self, room_id: &str, host_id: &str) -> Result<Room, GameError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(room_id) {
            return Err(GameError::RoomAlreadyExists);
        }
        let room = Room::new(room_id, host_id);
        rooms.insert(room_id.to_string(), room.clone());
        drop(rooms);

        self.insert_channel(room_id).await;
        tracing::info!("Room {} created by host {}", room_id, host_id);
        Ok(room)
    }

    /// Re-claim an existing room for a (possibly refreshed) host. Returns
    /// the current snapshot, or None if the room is gone.
    pub async fn claim_room(&self, room_id: &str, host_id: &str) -> Option<Room> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id)?;
        if room.host_id.as_deref() != Some(host_id) {
            tracing::info!("Room {} re-claimed by host {}", room_id, host_id);
            room.host_id = Some(host_id.to_string());
        }
        Some(room.clone())
    }

    pub async fn get_room(&self, room_id: &str) -> Option<Room> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Remove a room and its channel. Returns whether it existed.
    pub async fn delete_room(&self, room_id: &str) -> bool {
        let existed = self.rooms.write().await.remove(room_id).is_some();
        if existed {
            self.remove_channel(room_id).await;
            tracing::info!("Room {} deleted", room_id);
        }
        existed
    }

    /// Update the lobby's category filter.
    pub async fn update_categories(
        &self,
        room_id: &str,
        categories: Vec<String>,
    ) -> Result<Vec<String>, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        room.selected_categories = categories;
        Ok(room.selected_categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn create_initializes_a_lobby_room() {
        let state = state();
        let room = state.create_room("R1", "host-1").await.unwrap();

        assert_eq!(room.id, "R1");
        assert_eq!(room.host_id.as_deref(), Some("host-1"));
        assert_eq!(room.phase, RoomPhase::Lobby);
        assert!(room.players.is_empty());
        assert!(room.chips.is_empty());
        assert_eq!(room.total_rounds, TOTAL_ROUNDS);
    }

    #[tokio::test]
    async fn create_rejects_a_live_room_id() {
        let state = state();
        state.create_room("R1", "host-1").await.unwrap();

        assert_eq!(
            state.create_room("R1", "host-2").await,
            Err(GameError::RoomAlreadyExists)
        );
        // The first host's claim is untouched.
        let room = state.get_room("R1").await.unwrap();
        assert_eq!(room.host_id.as_deref(), Some("host-1"));
    }

    #[tokio::test]
    async fn claim_updates_the_host_id() {
        let state = state();
        state.create_room("R1", "host-1").await.unwrap();

        let room = state.claim_room("R1", "host-2").await.unwrap();
        assert_eq!(room.host_id.as_deref(), Some("host-2"));
        assert!(state.claim_room("nope", "host-2").await.is_none());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let state = state();
        state.create_room("R1", "host-1").await.unwrap();

        assert!(state.delete_room("R1").await);
        assert!(!state.delete_room("R1").await);
        assert!(state.get_room("R1").await.is_none());
    }

    #[tokio::test]
    async fn rooms_are_independent() {
        let state = state();
        room_with_players(&state, "R1", &["ann"]).await;
        room_with_players(&state, "R2", &["bob"]).await;

        state.delete_room("R1").await;

        let room = state.get_room("R2").await.unwrap();
        assert_eq!(room.players.len(), 1);
    }

    #[tokio::test]
    async fn categories_update_round_trips() {
        let state = state();
        state.create_room("R1", "host-1").await.unwrap();

        let cats = state
            .update_categories("R1", vec!["history".to_string(), "science".to_string()])
            .await
            .unwrap();
        assert_eq!(cats, vec!["history", "science"]);

        assert_eq!(
            state.update_categories("nope", vec![]).await,
            Err(GameError::RoomNotFound)
        );
    }
}
