//! The round lifecycle: game start, answer collection, wager-phase entry,
//! round advancement, and the host phase override.

use super::AppState;
use crate::error::GameError;
use crate::protocol::LeaderboardEntry;
use crate::tiles;
use crate::types::*;

/// Broadcast payload produced when the wager phase begins.
#[derive(Debug, Clone, PartialEq)]
pub struct WagerStart {
    pub answer_tiles: Vec<AnswerTile>,
    /// Players who were broke at the snapshot and get the comeback bet.
    pub zero_chip_players: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Everyone who has answered so far this round.
    pub answered: Vec<PlayerId>,
    /// Set when this submission was the last one and wagering has begun.
    pub wager_start: Option<WagerStart>,
}

#[derive(Debug, Clone)]
pub enum RoundAdvance {
    Next { round: u32, question: Question },
    Finished { leaderboard: Vec<LeaderboardEntry> },
}

impl AppState {
    /// Start the game: lock in the category filter, draw the first
    /// question, and enter the question phase.
    pub async fn start_game(
        &self,
        room_id: &str,
        categories: Vec<String>,
    ) -> Result<Room, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        if room.players.is_empty() {
            return Err(GameError::EmptyRoom);
        }

        let (index, question) = self
            .questions
            .draw(&categories, &room.used_questions)
            .ok_or(GameError::NoQuestion)?;

        room.selected_categories = categories;
        room.used_questions.insert(index);
        room.current_question = Some(question);
        room.current_round = 1;
        room.answers.clear();
        room.answer_tiles.clear();
        room.bets.clear();
        room.confirmed_wagers.clear();
        room.phase = RoomPhase::Question;

        tracing::info!(
            "Game started in room {} with {} players, round 1/{}",
            room_id,
            room.players.len(),
            room.total_rounds
        );
        Ok(room.clone())
    }

    /// Record (or replace) a player's guess. When the last outstanding
    /// player answers, the room rolls into the wager phase in the same
    /// operation and the outcome carries the derived tiles.
    pub async fn submit_answer(
        &self,
        room_id: &str,
        player_id: &str,
        guess: f64,
    ) -> Result<SubmitOutcome, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        if !room.has_player(player_id) {
            return Err(GameError::PlayerNotFound);
        }

        match room.answers.iter_mut().find(|a| a.player_id == player_id) {
            Some(existing) => existing.guess = guess,
            None => room.answers.push(Answer {
                player_id: player_id.to_string(),
                guess,
            }),
        }
        tracing::debug!(
            "Answer in room {}: {}/{} players",
            room_id,
            room.answers.len(),
            room.players.len()
        );

        let answered = room.answers.iter().map(|a| a.player_id.clone()).collect();
        let wager_start = if !room.players.is_empty() && room.answers.len() == room.players.len() {
            Some(begin_wager_phase(room))
        } else {
            None
        };

        Ok(SubmitOutcome {
            answered,
            wager_start,
        })
    }

    /// Advance past a payout: either a fresh question or, past the round
    /// cap, the finished leaderboard.
    pub async fn next_round(&self, room_id: &str) -> Result<RoundAdvance, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;

        let next = room.current_round + 1;
        if next > room.total_rounds {
            room.current_round = next;
            room.current_question = None;
            room.answers.clear();
            room.answer_tiles.clear();
            room.bets.clear();
            room.confirmed_wagers.clear();
            room.phase = RoomPhase::Finished;

            let mut leaderboard: Vec<LeaderboardEntry> = room
                .players
                .iter()
                .map(|p| LeaderboardEntry {
                    player_id: p.id.clone(),
                    name: p.name.clone(),
                    chips: room.chips.get(&p.id).copied().unwrap_or(0),
                })
                .collect();
            leaderboard.sort_by(|a, b| b.chips.cmp(&a.chips));

            tracing::info!("Game finished in room {}", room_id);
            return Ok(RoundAdvance::Finished { leaderboard });
        }

        let (index, question) = self
            .questions
            .draw(&room.selected_categories, &room.used_questions)
            .ok_or(GameError::NoQuestion)?;

        room.current_round = next;
        room.used_questions.insert(index);
        room.current_question = Some(question.clone());
        room.answers.clear();
        room.answer_tiles.clear();
        room.bets.clear();
        room.confirmed_wagers.clear();
        room.phase = RoomPhase::Question;

        tracing::info!(
            "Room {} advanced to round {}/{}",
            room_id,
            next,
            room.total_rounds
        );
        Ok(RoundAdvance::Next {
            round: next,
            question,
        })
    }

    /// Host debug override: force a phase without the usual transition
    /// rules. Does not touch any other room state.
    pub async fn set_phase(&self, room_id: &str, phase: RoomPhase) -> Result<RoomPhase, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        tracing::warn!(
            "Phase override in room {}: {:?} -> {:?}",
            room_id,
            room.phase,
            phase
        );
        room.phase = phase;
        Ok(phase)
    }
}

/// Roll the room into the wager phase: derive tiles from the collected
/// answers, snapshot balances for zero-chip eligibility, and reset the
/// round's wagering records.
fn begin_wager_phase(room: &mut Room) -> WagerStart {
    room.answer_tiles = tiles::derive_tiles(&room.answers);
    room.chips_at_wager_start = room.chips.clone();

    let zero_chip_players: Vec<PlayerId> = room
        .players
        .iter()
        .filter(|p| room.chips.get(&p.id) == Some(&0))
        .map(|p| p.id.clone())
        .collect();

    room.bets.clear();
    room.confirmed_wagers.clear();
    room.phase = RoomPhase::Wager;

    WagerStart {
        answer_tiles: room.answer_tiles.clone(),
        zero_chip_players,
    }
}
