//! Round settlement: winning-tile resolution and payout accounting.

use super::AppState;
use crate::error::GameError;
use crate::protocol::{PayoutItem, PayoutResult, PlayerPayout};
use crate::types::*;

impl AppState {
    /// Settle the round against the current question's answer.
    ///
    /// Fires either when the last player confirms their wagers or on the
    /// host's manual reveal. Only valid in the wager phase, which also
    /// makes settlement single-shot: the first call moves the room to
    /// payout and any racing second call fails cleanly.
    pub async fn settle_round(&self, room_id: &str) -> Result<PayoutResult, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        if room.phase != RoomPhase::Wager {
            return Err(GameError::WrongPhase);
        }
        let question = room.current_question.clone().ok_or(GameError::NoQuestion)?;
        let correct_answer = question.answer;

        // The winning tile is the last real tile not exceeding the answer;
        // when every guess is too high the synthetic smaller-tile wins.
        let mut winning_tile_index = 0;
        for (i, tile) in room.answer_tiles.iter().enumerate().skip(1) {
            if tile.guess.is_some_and(|g| g <= correct_answer) {
                winning_tile_index = i;
            }
        }
        let winning_tile = room
            .answer_tiles
            .get(winning_tile_index)
            .cloned()
            .ok_or(GameError::WrongPhase)?;

        let mut payouts: std::collections::HashMap<PlayerId, PlayerPayout> =
            std::collections::HashMap::new();
        let mut max_winnings: u32 = 0;

        for bet in &room.bets {
            if bet.tile_index != winning_tile_index || bet.amount == 0 {
                continue;
            }
            let winnings = bet.amount * winning_tile.multiplier;
            if let Some(balance) = room.chips.get_mut(&bet.player_id) {
                *balance += winnings;
            }
            let entry = payouts.entry(bet.player_id.clone()).or_default();
            entry.total += winnings;
            entry.items.push(PayoutItem {
                amount: bet.amount,
                multiplier: winning_tile.multiplier,
                winnings,
            });
            max_winnings = max_winnings.max(winnings);
        }

        // Zero-chip comeback: a flat bonus when the whole table was broke,
        // else a quarter of the best winning bet. Losing selections cost
        // nothing.
        let all_players_were_zero_chip = !room.players.is_empty()
            && room
                .players
                .iter()
                .all(|p| room.chips_at_wager_start.get(&p.id) == Some(&0));
        let bonus = if all_players_were_zero_chip {
            ZERO_CHIP_FLAT_BONUS
        } else {
            (ZERO_CHIP_BONUS_RATE * f64::from(max_winnings)).floor() as u32
        };

        for bet in &room.bets {
            if !bet.is_zero_chip_bet || bet.tile_index != winning_tile_index {
                continue;
            }
            if let Some(balance) = room.chips.get_mut(&bet.player_id) {
                *balance += bonus;
            }
            let entry = payouts.entry(bet.player_id.clone()).or_default();
            entry.total += bonus;
            entry.is_zero_chip_bonus = true;
            entry.items.push(PayoutItem {
                amount: 0,
                multiplier: winning_tile.multiplier,
                winnings: bonus,
            });
        }

        room.phase = RoomPhase::Payout;

        tracing::info!(
            "Room {} settled: answer {}, tile {} at {}x, {} winning players",
            room_id,
            correct_answer,
            winning_tile_index,
            winning_tile.multiplier,
            payouts.len()
        );

        Ok(PayoutResult {
            correct_answer,
            explanation: question.explanation,
            source: question.source,
            winning_tile_index,
            winning_tile,
            payouts,
            chips: room.chips.clone(),
            answer_tiles: room.answer_tiles.clone(),
            max_winnings,
        })
    }
}
