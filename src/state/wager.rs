//! Bet placement, removal, and wager confirmation.

use super::AppState;
use crate::error::GameError;
use crate::types::*;
use std::collections::HashMap;

/// Broadcast payload after any bet mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct WagerUpdate {
    pub bets: Vec<Bet>,
    pub chips: HashMap<PlayerId, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmOutcome {
    /// The player had already confirmed; nothing changed.
    pub already_confirmed: bool,
    pub confirmed_count: usize,
    pub total_players: usize,
    /// True once every player has confirmed - the settlement trigger.
    pub all_confirmed: bool,
    pub confirmed: Vec<PlayerId>,
}

impl AppState {
    /// Place a bet on a tile. Normal bets are funded immediately from the
    /// player's balance; a zero-amount bet from a player who was broke at
    /// wager start is the zero-chip comeback selection instead (placing a
    /// new one moves the old selection).
    pub async fn place_bet(
        &self,
        room_id: &str,
        player_id: &str,
        tile_index: usize,
        amount: u32,
    ) -> Result<WagerUpdate, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        if !room.has_player(player_id) {
            return Err(GameError::PlayerNotFound);
        }
        if room.confirmed_wagers.contains(player_id) {
            return Err(GameError::WagersAlreadyConfirmed);
        }
        if tile_index >= room.answer_tiles.len() {
            return Err(GameError::InvalidTile);
        }

        if amount == 0 && room.was_zero_chip_at_wager_start(player_id) {
            room.bets
                .retain(|b| !(b.player_id == player_id && b.is_zero_chip_bet));
            room.bets.push(Bet {
                player_id: player_id.to_string(),
                tile_index,
                amount: 0,
                is_zero_chip_bet: true,
            });
            tracing::debug!(
                "Zero-chip selection in room {}: {} on tile {}",
                room_id,
                player_id,
                tile_index
            );
        } else {
            if amount == 0 {
                return Err(GameError::InvalidAmount);
            }
            let balance = room
                .chips
                .get_mut(player_id)
                .ok_or(GameError::PlayerNotFound)?;
            if amount > *balance {
                return Err(GameError::InsufficientChips);
            }
            *balance -= amount;

            match room.bets.iter_mut().find(|b| {
                b.player_id == player_id && b.tile_index == tile_index && !b.is_zero_chip_bet
            }) {
                Some(existing) => existing.amount += amount,
                None => room.bets.push(Bet {
                    player_id: player_id.to_string(),
                    tile_index,
                    amount,
                    is_zero_chip_bet: false,
                }),
            }
            tracing::debug!(
                "Bet in room {}: {} put {} on tile {}",
                room_id,
                player_id,
                amount,
                tile_index
            );
        }

        Ok(WagerUpdate {
            bets: room.bets.clone(),
            chips: room.chips.clone(),
        })
    }

    /// Take back the player's bet on a tile, refunding its amount. Only
    /// valid before the player confirms.
    pub async fn remove_bet(
        &self,
        room_id: &str,
        player_id: &str,
        tile_index: usize,
    ) -> Result<WagerUpdate, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        if room.confirmed_wagers.contains(player_id) {
            return Err(GameError::WagersAlreadyConfirmed);
        }

        let pos = room
            .bets
            .iter()
            .position(|b| b.player_id == player_id && b.tile_index == tile_index)
            .ok_or(GameError::BetNotFound)?;
        let bet = room.bets.remove(pos);

        if bet.amount > 0 {
            if let Some(balance) = room.chips.get_mut(player_id) {
                *balance += bet.amount;
            }
        }
        tracing::debug!(
            "Bet removed in room {}: {} freed tile {} (refunded {})",
            room_id,
            player_id,
            tile_index,
            bet.amount
        );

        Ok(WagerUpdate {
            bets: room.bets.clone(),
            chips: room.chips.clone(),
        })
    }

    /// Lock in a player's wagers. Zero-chip players must have made their
    /// comeback selection first. Confirmation is a one-way latch for the
    /// round; re-confirming is a no-op reported as such.
    pub async fn confirm_wager(
        &self,
        room_id: &str,
        player_id: &str,
    ) -> Result<ConfirmOutcome, GameError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        if !room.has_player(player_id) {
            return Err(GameError::PlayerNotFound);
        }

        let already_confirmed = room.confirmed_wagers.contains(player_id);
        if !already_confirmed {
            let needs_selection = room.was_zero_chip_at_wager_start(player_id)
                && !room
                    .bets
                    .iter()
                    .any(|b| b.player_id == player_id && b.is_zero_chip_bet);
            if needs_selection {
                return Err(GameError::MustSelectTile);
            }
            room.confirmed_wagers.insert(player_id.to_string());
        }

        let confirmed_count = room.confirmed_wagers.len();
        let total_players = room.players.len();
        let mut confirmed: Vec<PlayerId> = room.confirmed_wagers.iter().cloned().collect();
        confirmed.sort();

        tracing::debug!(
            "Wagers confirmed in room {}: {}/{}",
            room_id,
            confirmed_count,
            total_players
        );
        Ok(ConfirmOutcome {
            already_confirmed,
            confirmed_count,
            total_players,
            all_confirmed: total_players > 0 && confirmed_count == total_players,
            confirmed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    /// Two players, game started, both answered: room is in wager phase
    /// with tiles [smaller, 100, 200].
    async fn wagering_room(state: &AppState) {
        room_with_players(state, "R1", &["ann", "bob"]).await;
        state.start_game("R1", vec![]).await.unwrap();
        state.submit_answer("R1", "id-ann", 100.0).await.unwrap();
        state.submit_answer("R1", "id-bob", 200.0).await.unwrap();
    }

    /// Force a player's balance, re-snapshotting wager-start balances.
    async fn set_chips_at_wager_start(state: &AppState, player_id: &str, chips: u32) {
        let mut rooms = state.rooms.write().await;
        let room = rooms.get_mut("R1").unwrap();
        room.chips.insert(player_id.to_string(), chips);
        room.chips_at_wager_start
            .insert(player_id.to_string(), chips);
    }

    #[tokio::test]
    async fn bets_are_funded_at_placement() {
        let state = state();
        wagering_room(&state).await;

        let update = state.place_bet("R1", "id-ann", 1, 150).await.unwrap();

        assert_eq!(update.chips.get("id-ann"), Some(&(STARTING_CHIPS - 150)));
        assert_eq!(update.bets.len(), 1);
        assert_eq!(update.bets[0].tile_index, 1);
        assert_eq!(update.bets[0].amount, 150);
        assert!(!update.bets[0].is_zero_chip_bet);
    }

    #[tokio::test]
    async fn overdrawn_bet_is_rejected_without_mutation() {
        let state = state();
        wagering_room(&state).await;

        assert_eq!(
            state.place_bet("R1", "id-ann", 1, STARTING_CHIPS + 1).await,
            Err(GameError::InsufficientChips)
        );

        let room = state.get_room("R1").await.unwrap();
        assert_eq!(room.chips.get("id-ann"), Some(&STARTING_CHIPS));
        assert!(room.bets.is_empty());
    }

    #[tokio::test]
    async fn zero_amount_from_a_funded_player_is_invalid() {
        let state = state();
        wagering_room(&state).await;

        assert_eq!(
            state.place_bet("R1", "id-ann", 1, 0).await,
            Err(GameError::InvalidAmount)
        );
    }

    #[tokio::test]
    async fn out_of_range_tile_is_rejected() {
        let state = state();
        wagering_room(&state).await;

        assert_eq!(
            state.place_bet("R1", "id-ann", 9, 10).await,
            Err(GameError::InvalidTile)
        );
    }

    #[tokio::test]
    async fn repeat_bets_on_a_tile_merge() {
        let state = state();
        wagering_room(&state).await;

        state.place_bet("R1", "id-ann", 1, 100).await.unwrap();
        let update = state.place_bet("R1", "id-ann", 1, 50).await.unwrap();

        assert_eq!(update.bets.len(), 1);
        assert_eq!(update.bets[0].amount, 150);
        assert_eq!(update.chips.get("id-ann"), Some(&(STARTING_CHIPS - 150)));
    }

    #[tokio::test]
    async fn betting_everything_is_allowed_and_is_not_zero_chip() {
        let state = state();
        wagering_room(&state).await;

        state
            .place_bet("R1", "id-ann", 1, STARTING_CHIPS)
            .await
            .unwrap();

        // Balance hit zero during wagering, but the snapshot rules: a
        // zero-amount follow-up is still an invalid normal bet.
        assert_eq!(
            state.place_bet("R1", "id-ann", 2, 0).await,
            Err(GameError::InvalidAmount)
        );
    }

    #[tokio::test]
    async fn remove_refunds_the_full_tile_amount() {
        let state = state();
        wagering_room(&state).await;
        state.place_bet("R1", "id-ann", 1, 100).await.unwrap();
        state.place_bet("R1", "id-ann", 2, 50).await.unwrap();

        let update = state.remove_bet("R1", "id-ann", 1).await.unwrap();

        assert_eq!(update.chips.get("id-ann"), Some(&(STARTING_CHIPS - 50)));
        assert_eq!(update.bets.len(), 1);
        assert_eq!(update.bets[0].tile_index, 2);

        assert_eq!(
            state.remove_bet("R1", "id-ann", 1).await,
            Err(GameError::BetNotFound)
        );
    }

    #[tokio::test]
    async fn zero_chip_player_selects_and_moves_a_free_bet() {
        let state = state();
        wagering_room(&state).await;
        set_chips_at_wager_start(&state, "id-ann", 0).await;

        let update = state.place_bet("R1", "id-ann", 2, 0).await.unwrap();
        assert_eq!(update.bets.len(), 1);
        assert!(update.bets[0].is_zero_chip_bet);
        assert_eq!(update.bets[0].tile_index, 2);

        // Re-selecting moves the single free bet instead of stacking.
        let update = state.place_bet("R1", "id-ann", 0, 0).await.unwrap();
        let zero_bets: Vec<&Bet> = update
            .bets
            .iter()
            .filter(|b| b.player_id == "id-ann" && b.is_zero_chip_bet)
            .collect();
        assert_eq!(zero_bets.len(), 1);
        assert_eq!(zero_bets[0].tile_index, 0);
        assert_eq!(update.chips.get("id-ann"), Some(&0));
    }

    #[tokio::test]
    async fn confirmation_is_a_one_way_latch() {
        let state = state();
        wagering_room(&state).await;
        state.place_bet("R1", "id-ann", 1, 100).await.unwrap();
        state.confirm_wager("R1", "id-ann").await.unwrap();

        assert_eq!(
            state.place_bet("R1", "id-ann", 2, 10).await,
            Err(GameError::WagersAlreadyConfirmed)
        );
        assert_eq!(
            state.remove_bet("R1", "id-ann", 1).await,
            Err(GameError::WagersAlreadyConfirmed)
        );
    }

    #[tokio::test]
    async fn confirm_counts_and_reports_completion() {
        let state = state();
        wagering_room(&state).await;

        let first = state.confirm_wager("R1", "id-ann").await.unwrap();
        assert!(!first.already_confirmed);
        assert_eq!(first.confirmed_count, 1);
        assert_eq!(first.total_players, 2);
        assert!(!first.all_confirmed);

        let second = state.confirm_wager("R1", "id-bob").await.unwrap();
        assert!(second.all_confirmed);
        assert_eq!(second.confirmed, vec!["id-ann", "id-bob"]);
    }

    #[tokio::test]
    async fn reconfirming_is_idempotent() {
        let state = state();
        wagering_room(&state).await;
        state.confirm_wager("R1", "id-ann").await.unwrap();

        let again = state.confirm_wager("R1", "id-ann").await.unwrap();
        assert!(again.already_confirmed);
        assert_eq!(again.confirmed_count, 1);
    }

    #[tokio::test]
    async fn zero_chip_player_cannot_confirm_without_a_selection() {
        let state = state();
        wagering_room(&state).await;
        set_chips_at_wager_start(&state, "id-ann", 0).await;

        assert_eq!(
            state.confirm_wager("R1", "id-ann").await,
            Err(GameError::MustSelectTile)
        );
        let room = state.get_room("R1").await.unwrap();
        assert!(!room.confirmed_wagers.contains("id-ann"));

        state.place_bet("R1", "id-ann", 1, 0).await.unwrap();
        let outcome = state.confirm_wager("R1", "id-ann").await.unwrap();
        assert_eq!(outcome.confirmed_count, 1);
    }

    #[tokio::test]
    async fn normal_player_may_confirm_without_any_bet() {
        let state = state();
        wagering_room(&state).await;

        let outcome = state.confirm_wager("R1", "id-ann").await.unwrap();
        assert_eq!(outcome.confirmed_count, 1);
    }
}
