use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        room_id: RoomId,
        host_id: String,
    },
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        player: Option<Player>,
        #[serde(default)]
        is_host: bool,
        #[serde(default)]
        host_id: Option<String>,
    },
    LeaveRoom {
        room_id: RoomId,
        player_id: PlayerId,
    },
    DeleteRoom {
        room_id: RoomId,
        host_id: String,
    },
    SubmitAnswer {
        room_id: RoomId,
        player_id: PlayerId,
        guess: f64,
    },
    PlaceBet {
        room_id: RoomId,
        player_id: PlayerId,
        tile_index: usize,
        amount: u32,
    },
    RemoveBet {
        room_id: RoomId,
        player_id: PlayerId,
        tile_index: usize,
    },
    ConfirmWagers {
        room_id: RoomId,
        player_id: PlayerId,
    },
    /// Host manual trigger; settlement normally fires when the last player
    /// confirms.
    RevealAnswer {
        room_id: RoomId,
    },
    StartGame {
        room_id: RoomId,
        #[serde(default)]
        categories: Vec<String>,
    },
    NextRound {
        room_id: RoomId,
    },
    /// Debug/override: force a phase without the usual transition rules.
    SetPhase {
        room_id: RoomId,
        phase: RoomPhase,
    },
    UpdateCategories {
        room_id: RoomId,
        categories: Vec<String>,
    },
    /// Resync request after a reconnect.
    RequestRoomState {
        room_id: RoomId,
    },
}

impl ClientMessage {
    /// Every client message targets exactly one room.
    pub fn room_id(&self) -> &str {
        match self {
            ClientMessage::CreateRoom { room_id, .. }
            | ClientMessage::JoinRoom { room_id, .. }
            | ClientMessage::LeaveRoom { room_id, .. }
            | ClientMessage::DeleteRoom { room_id, .. }
            | ClientMessage::SubmitAnswer { room_id, .. }
            | ClientMessage::PlaceBet { room_id, .. }
            | ClientMessage::RemoveBet { room_id, .. }
            | ClientMessage::ConfirmWagers { room_id, .. }
            | ClientMessage::RevealAnswer { room_id }
            | ClientMessage::StartGame { room_id, .. }
            | ClientMessage::NextRound { room_id }
            | ClientMessage::SetPhase { room_id, .. }
            | ClientMessage::UpdateCategories { room_id, .. }
            | ClientMessage::RequestRoomState { room_id } => room_id,
        }
    }

    /// Whether a successful handling of this message should subscribe the
    /// connection to the room's broadcast channel.
    pub fn establishes_subscription(&self) -> bool {
        matches!(
            self,
            ClientMessage::CreateRoom { .. }
                | ClientMessage::JoinRoom { .. }
                | ClientMessage::RequestRoomState { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        server_now: String,
    },
    RoomCreated {
        room: RoomSnapshot,
    },
    RoomUpdate {
        room: RoomSnapshot,
    },
    PlayersUpdate {
        players: Vec<Player>,
    },
    ChipsUpdate {
        chips: HashMap<PlayerId, u32>,
    },
    /// Who has answered so far. Guess values stay server-side until the
    /// tiles are revealed.
    AnswersUpdate {
        answered: Vec<PlayerId>,
    },
    AnswersRevealed {
        answer_tiles: Vec<AnswerTile>,
        zero_chip_players: Vec<PlayerId>,
        phase: RoomPhase,
    },
    BetsUpdate {
        bets: Vec<Bet>,
        chips: HashMap<PlayerId, u32>,
    },
    WagersConfirmed {
        confirmed_count: usize,
        total_players: usize,
        confirmed_wagers: Vec<PlayerId>,
    },
    PayoutResult {
        result: PayoutResult,
    },
    GameStarted {
        round: u32,
        total_rounds: u32,
        question: QuestionInfo,
        chips: HashMap<PlayerId, u32>,
    },
    RoundAdvanced {
        phase: RoomPhase,
        round: u32,
        question: QuestionInfo,
    },
    GameFinished {
        leaderboard: Vec<LeaderboardEntry>,
    },
    CategoriesUpdate {
        categories: Vec<String>,
    },
    PhaseChanged {
        phase: RoomPhase,
    },
    RoomDeleted {
        room_id: RoomId,
    },
    LeftRoom {
        room_id: RoomId,
    },
    RoomState {
        room: RoomSnapshot,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(err: crate::error::GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// Public question info (no answer, to prevent spoilers)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionInfo {
    pub category: String,
    pub question: String,
}

impl From<&Question> for QuestionInfo {
    fn from(q: &Question) -> Self {
        Self {
            category: q.category.clone(),
            question: q.question.clone(),
        }
    }
}

/// Public view of a room broadcast to all participants. The current
/// question is sanitized; the correct answer only ever travels inside a
/// `PayoutResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub host_id: Option<String>,
    pub phase: RoomPhase,
    pub players: Vec<Player>,
    pub selected_categories: Vec<String>,
    pub current_round: u32,
    pub total_rounds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionInfo>,
    pub answered: Vec<PlayerId>,
    pub answer_tiles: Vec<AnswerTile>,
    pub bets: Vec<Bet>,
    pub confirmed_wagers: Vec<PlayerId>,
    pub chips: HashMap<PlayerId, u32>,
    pub created_at: String,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        let mut confirmed_wagers: Vec<PlayerId> =
            room.confirmed_wagers.iter().cloned().collect();
        confirmed_wagers.sort();

        Self {
            id: room.id.clone(),
            host_id: room.host_id.clone(),
            phase: room.phase,
            players: room.players.clone(),
            selected_categories: room.selected_categories.clone(),
            current_round: room.current_round,
            total_rounds: room.total_rounds,
            question: room.current_question.as_ref().map(QuestionInfo::from),
            answered: room.answers.iter().map(|a| a.player_id.clone()).collect(),
            answer_tiles: room.answer_tiles.clone(),
            bets: room.bets.clone(),
            confirmed_wagers,
            chips: room.chips.clone(),
            created_at: room.created_at.clone(),
        }
    }
}

/// One itemized winning bet in a payout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutItem {
    pub amount: u32,
    pub multiplier: u32,
    pub winnings: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerPayout {
    pub total: u32,
    pub items: Vec<PayoutItem>,
    pub is_zero_chip_bonus: bool,
}

/// Full settlement result for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutResult {
    pub correct_answer: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub winning_tile_index: usize,
    pub winning_tile: AnswerTile,
    pub payouts: HashMap<PlayerId, PlayerPayout>,
    pub chips: HashMap<PlayerId, u32>,
    pub answer_tiles: Vec<AnswerTile>,
    pub max_winnings: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub chips: u32,
}
