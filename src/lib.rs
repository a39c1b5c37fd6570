use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use difficulty::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use progression::*;
pub use types::*;

mod card;
mod difficulty;
mod engine;
mod error;
mod generator;
mod progression;
mod types;

/// Grid dimensions of a level.
///
/// Both axes are at least 2 and `rows * cols` is even and at least 4, so the
/// grid always holds a whole number of pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: Coord,
    pub cols: Coord,
}

impl GridShape {
    pub const fn new_unchecked(rows: Coord, cols: Coord) -> Self {
        Self { rows, cols }
    }

    pub const fn total_cards(&self) -> CardCount {
        mult(self.rows, self.cols)
    }

    pub const fn pair_count(&self) -> CardCount {
        self.total_cards() / 2
    }

    /// Largest Manhattan distance between two cells of this grid.
    pub const fn max_manhattan(&self) -> Coord {
        (self.rows - 1) + (self.cols - 1)
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.0 < self.rows && pos.1 < self.cols
    }
}

impl ToNdIndex for GridShape {
    type Output = (usize, usize);

    fn to_nd_index(self) -> Self::Output {
        (self.rows as usize, self.cols as usize)
    }
}

/// A generated level: the card grid plus its play and record bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: u32,
    pub grid_size: GridShape,
    pub difficulty: f64,
    pub is_completed: bool,
    pub moves: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_moves: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time: Option<Millis>,
    pub cards: Array2<Card>,
}

impl Level {
    pub fn validate_pos(&self, pos: Pos) -> Result<Pos> {
        if self.grid_size.contains(pos) {
            Ok(pos)
        } else {
            Err(GameError::InvalidPos)
        }
    }

    pub fn card_at(&self, pos: Pos) -> &Card {
        &self.cards[pos.to_nd_index()]
    }

    pub(crate) fn card_mut(&mut self, pos: Pos) -> &mut Card {
        &mut self.cards[pos.to_nd_index()]
    }

    pub fn matched_count(&self) -> CardCount {
        self.cards.iter().filter(|card| card.is_matched).count() as CardCount
    }

    pub fn all_matched(&self) -> bool {
        self.matched_count() == self.grid_size.total_cards()
    }

    /// Marks the level completed, recording the run and min-updating bests.
    pub(crate) fn record_completion(&mut self, moves: u32, time_spent: Millis) {
        self.is_completed = true;
        self.moves = moves;
        self.time_spent = Some(time_spent);
        self.best_moves = Some(self.best_moves.map_or(moves, |best| best.min(moves)));
        self.best_time = Some(self.best_time.map_or(time_spent, |best| best.min(time_spent)));
    }
}
