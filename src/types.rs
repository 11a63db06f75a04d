use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;

/// Chips handed to every player when they join a room.
pub const STARTING_CHIPS: u32 = 500;

/// Maximum number of players per room, not counting the host.
pub const MAX_PLAYERS: usize = 7;

/// Rounds played before a game finishes.
pub const TOTAL_ROUNDS: u32 = 7;

/// Flat bonus paid to a correct zero-chip bet when every player was broke
/// at wager start (there are no normal winnings to derive a bonus from).
pub const ZERO_CHIP_FLAT_BONUS: u32 = 250;

/// Fraction of the best single winning bet paid to a correct zero-chip bet.
pub const ZERO_CHIP_BONUS_RATE: f64 = 0.25;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhase {
    Lobby,
    Question,
    Wager,
    Payout,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub category: String,
    pub question: String,
    pub answer: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A player's numeric guess for the current round. At most one per player;
/// resubmitting replaces the previous entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub player_id: PlayerId,
    pub guess: f64,
}

/// A bettable outcome bucket derived from the submitted guesses.
///
/// Index 0 of a tile list is always the synthetic "smaller than every
/// submitted guess" tile (`guess` is None); real tiles follow in strictly
/// ascending guess order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerTile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guess: Option<f64>,
    pub is_smaller_tile: bool,
    pub multiplier: u32,
    /// Players whose guess landed on this tile (empty for the smaller tile).
    pub player_ids: Vec<PlayerId>,
}

/// A placed wager. Bets are funded at placement time, so `amount` has
/// already been deducted from the player's balance. `amount` is 0 only for
/// the zero-chip comeback mechanic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    pub player_id: PlayerId,
    pub tile_index: usize,
    pub amount: u32,
    pub is_zero_chip_bet: bool,
}

/// One game session. All mutation goes through the engine operations on
/// `AppState`; the struct itself is plain data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub host_id: Option<String>,
    pub phase: RoomPhase,
    pub players: Vec<Player>,
    /// Category filter for question selection; empty means all categories.
    pub selected_categories: Vec<String>,
    pub current_question: Option<Question>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub answers: Vec<Answer>,
    pub answer_tiles: Vec<AnswerTile>,
    pub bets: Vec<Bet>,
    pub confirmed_wagers: HashSet<PlayerId>,
    pub chips: HashMap<PlayerId, u32>,
    /// Balances snapshotted the moment wager phase begins. A player who bets
    /// down to zero during wagering must not count as zero-chip eligible, so
    /// eligibility is always checked against this snapshot, never `chips`.
    pub chips_at_wager_start: HashMap<PlayerId, u32>,
    /// Catalog indices already drawn by this room, so rounds don't repeat a
    /// question until the filtered catalog is exhausted.
    pub used_questions: HashSet<usize>,
    pub created_at: String,
}

impl Room {
    pub fn new(id: &str, host_id: &str) -> Self {
        Self {
            id: id.to_string(),
            host_id: Some(host_id.to_string()),
            phase: RoomPhase::Lobby,
            players: Vec::new(),
            selected_categories: Vec::new(),
            current_question: None,
            current_round: 0,
            total_rounds: TOTAL_ROUNDS,
            answers: Vec::new(),
            answer_tiles: Vec::new(),
            bets: Vec::new(),
            confirmed_wagers: HashSet::new(),
            chips: HashMap::new(),
            chips_at_wager_start: HashMap::new(),
            used_questions: HashSet::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Whether this player had a zero balance when the wager phase began.
    pub fn was_zero_chip_at_wager_start(&self, player_id: &str) -> bool {
        self.chips_at_wager_start.get(player_id) == Some(&0)
    }
}
