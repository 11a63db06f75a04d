mod game;
mod payout;
mod player;
mod room;
mod wager;

pub use game::{RoundAdvance, SubmitOutcome, WagerStart};
pub use wager::{ConfirmOutcome, WagerUpdate};

use crate::protocol::ServerMessage;
use crate::questions::QuestionBank;
use crate::types::*;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// Shared application state: the room store plus one broadcast channel per
/// live room.
///
/// Every engine operation takes the store's write lock for its full
/// duration, so operations on a room are applied strictly in arrival order
/// and two simultaneous "last confirmer" calls can never both trigger
/// settlement. Nothing awaits while the lock is held; broadcasting happens
/// after it is dropped.
pub struct AppState {
    pub rooms: RwLock<HashMap<RoomId, Room>>,
    channels: RwLock<HashMap<RoomId, broadcast::Sender<ServerMessage>>>,
    pub questions: QuestionBank,
}

impl AppState {
    pub fn new(questions: QuestionBank) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
            questions,
        }
    }

    /// Subscribe to a room's broadcast stream. None if the room is gone.
    pub async fn subscribe(&self, room_id: &str) -> Option<broadcast::Receiver<ServerMessage>> {
        self.channels
            .read()
            .await
            .get(room_id)
            .map(|tx| tx.subscribe())
    }

    /// Fan a message out to everyone in a room. Send errors are ignored; a
    /// room with no connected receivers is fine.
    pub async fn broadcast_to_room(&self, room_id: &str, msg: ServerMessage) {
        let sender = self.channels.read().await.get(room_id).cloned();
        if let Some(tx) = sender {
            let _ = tx.send(msg);
        }
    }

    pub(crate) async fn insert_channel(&self, room_id: &str) {
        let (tx, _rx) = broadcast::channel(100);
        self.channels.write().await.insert(room_id.to_string(), tx);
    }

    pub(crate) async fn remove_channel(&self, room_id: &str) {
        self.channels.write().await.remove(room_id);
    }
}
