//! Betting tile derivation.
//!
//! Turns the current round's guesses into an ordered list of bettable tiles.
//! Pure functions, no room state involved.

use crate::types::{Answer, AnswerTile, PlayerId};

/// Derive the betting tiles for a set of submitted guesses.
///
/// Guesses are grouped by exact value (players who guessed the same number
/// share a tile), sorted ascending, and assigned multipliers that grow from
/// the middle outward. A synthetic "smaller than every guess" tile is
/// prepended at index 0 with the highest multiplier of all.
pub fn derive_tiles(answers: &[Answer]) -> Vec<AnswerTile> {
    let mut groups: Vec<(f64, Vec<PlayerId>)> = Vec::new();
    for answer in answers {
        match groups.iter_mut().find(|(value, _)| *value == answer.guess) {
            Some((_, ids)) => ids.push(answer.player_id.clone()),
            None => groups.push((answer.guess, vec![answer.player_id.clone()])),
        }
    }
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = groups.len();
    let mut tiles: Vec<AnswerTile> = groups
        .into_iter()
        .enumerate()
        .map(|(i, (guess, player_ids))| AnswerTile {
            guess: Some(guess),
            is_smaller_tile: false,
            multiplier: position_multiplier(i, n),
            player_ids,
        })
        .collect();

    // The smaller-than-all tile always pays one step above the best real
    // tile; with no guesses at all the baseline is taken as 2.
    let top = tiles.iter().map(|t| t.multiplier).max().unwrap_or(2);
    tiles.insert(
        0,
        AnswerTile {
            guess: None,
            is_smaller_tile: true,
            multiplier: top + 1,
            player_ids: Vec::new(),
        },
    );
    tiles
}

/// Multiplier for the tile at ascending position `i` of `n` distinct guesses.
///
/// Odd counts are symmetric around the center tile (2x, growing by 1 per
/// step outward). Even counts give both middle tiles 3x; the right half then
/// pays one step more than the mirrored left half. The exact even-count
/// sequence is pinned by test so any change to it is deliberate.
fn position_multiplier(i: usize, n: usize) -> u32 {
    if n % 2 == 1 {
        let center = n / 2;
        i.abs_diff(center) as u32 + 2
    } else {
        let left_mid = n / 2 - 1;
        let right_mid = n / 2;
        if i < left_mid {
            3 + (left_mid - i) as u32
        } else if i > right_mid {
            4 + (i - right_mid) as u32
        } else {
            3
        }
    }
}
