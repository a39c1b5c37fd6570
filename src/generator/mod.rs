use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::*;
pub use symbols::*;

mod symbols;

/// Grid dimensions for a 1-based level number.
///
/// `rows = floor((level-1)/2) + 2`, `cols = ceil((level-1)/2) + 2`; when the
/// product comes out odd the non-larger axis grows by one to keep the card
/// count even. Grid size is therefore deterministic and non-decreasing, with
/// growth alternating between the two axes.
pub fn grid_shape_for_level(level: u32) -> Result<GridShape> {
    if level < 1 {
        return Err(GameError::InvalidLevel);
    }

    let mut rows = (level - 1) / 2 + 2;
    let mut cols = level / 2 + 2;
    if (rows * cols) % 2 != 0 {
        if cols > rows {
            rows += 1;
        } else {
            cols += 1;
        }
    }
    Ok(GridShape::new_unchecked(rows, cols))
}

/// Compact persisted form of a level's layout: symbol indices in row-major
/// order. Two cells carry the same index iff their cards were a pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBoard {
    pub grid_size: GridShape,
    pub cells: Vec<u32>,
}

/// Encodes a level's pairing structure, dropping the literal symbols.
/// Indices are assigned by first appearance in row-major order.
pub fn board_from_level(level: &Level) -> StoredBoard {
    let mut index_of: HashMap<&str, u32> = HashMap::new();
    let mut cells = Vec::with_capacity(level.cards.len());
    for card in level.cards.iter() {
        let next = index_of.len() as u32;
        let index = *index_of.entry(card.symbol.as_str()).or_insert(next);
        cells.push(index);
    }
    StoredBoard {
        grid_size: level.grid_size,
        cells,
    }
}

/// Deterministic level builder: the same seed and level number always yield
/// the same layout.
#[derive(Clone, Debug)]
pub struct LevelGenerator<S: SymbolSource = CuratedSource> {
    provider: EmojiProvider<S>,
    seed: u64,
}

impl LevelGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_source(CuratedSource, seed)
    }
}

impl<S: SymbolSource> LevelGenerator<S> {
    pub fn with_source(source: S, seed: u64) -> Self {
        Self {
            provider: EmojiProvider::with_source(source),
            seed,
        }
    }

    fn rng_for_level(&self, level: u32) -> SmallRng {
        let mixed = self.seed ^ u64::from(level).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        SmallRng::seed_from_u64(mixed)
    }

    /// Builds a fresh, fully hidden level: shape from the level number, one
    /// symbol pair per two cells, Fisher-Yates shuffled, difficulty scored
    /// from the resulting layout.
    pub fn generate(&self, level: u32) -> Result<Level> {
        let shape = grid_shape_for_level(level)?;
        let mut rng = self.rng_for_level(level);

        let pairs = shape.pair_count() as usize;
        let symbols = self.provider.symbols_for_level(level, pairs, &mut rng);

        let mut values: Vec<String> = Vec::with_capacity(pairs * 2);
        for symbol in symbols {
            values.push(symbol.clone());
            values.push(symbol);
        }
        values.shuffle(&mut rng);

        let cards = lay_out(shape, values, false);
        let difficulty = crate::difficulty::score(level, &cards, shape);
        log::debug!(
            "generated level {level}: {}x{} grid, difficulty {difficulty}",
            shape.rows,
            shape.cols
        );

        Ok(Level {
            id: level,
            grid_size: shape,
            difficulty,
            is_completed: false,
            moves: 0,
            best_moves: None,
            time_spent: None,
            best_time: None,
            cards,
        })
    }

    /// Rebuilds a completed level from its stored compact board for replay
    /// or review. The pairing structure is preserved exactly; the literal
    /// symbols are re-derived for the level's category and may differ from
    /// the original run. Every card comes back revealed and matched.
    pub fn level_from_board(&self, id: u32, board: &StoredBoard) -> Result<Level> {
        if id < 1 {
            return Err(GameError::InvalidLevel);
        }

        let shape = board.grid_size;
        let total = shape.total_cards();
        if shape.rows < 2 || shape.cols < 2 || total % 2 != 0 {
            return Err(GameError::InvalidBoardShape);
        }
        if board.cells.len() as CardCount != total {
            return Err(GameError::InvalidBoardShape);
        }

        let mut counts: HashMap<u32, u32> = HashMap::new();
        for &index in &board.cells {
            *counts.entry(index).or_insert(0) += 1;
        }
        if counts.values().any(|&count| count != 2) {
            return Err(GameError::InvalidBoardShape);
        }

        let mut rng = self.rng_for_level(id);
        let symbols = self
            .provider
            .symbols_for_level(id, counts.len(), &mut rng);

        // assign symbols to indices in first-appearance order
        let mut symbol_of: HashMap<u32, String> = HashMap::new();
        let mut next = symbols.into_iter();
        let mut values = Vec::with_capacity(board.cells.len());
        for &index in &board.cells {
            let symbol = symbol_of
                .entry(index)
                .or_insert_with(|| next.next().unwrap_or_default());
            values.push(symbol.clone());
        }

        let cards = lay_out(shape, values, true);
        let difficulty = crate::difficulty::score(id, &cards, shape);

        Ok(Level {
            id,
            grid_size: shape,
            difficulty,
            is_completed: true,
            moves: 0,
            best_moves: None,
            time_spent: None,
            best_time: None,
            cards,
        })
    }
}

/// Lays `values` out row-major into a card grid.
fn lay_out(shape: GridShape, values: Vec<String>, face_up: bool) -> Array2<Card> {
    let cols = shape.cols as usize;
    let cards: Vec<Card> = values
        .into_iter()
        .enumerate()
        .map(|(i, symbol)| {
            let mut card = Card::new((i / cols) as Coord, (i % cols) as Coord, symbol);
            if face_up {
                card.is_revealed = true;
                card.is_matched = true;
            }
            card
        })
        .collect();
    Array2::from_shape_vec(shape.to_nd_index(), cards).expect("row-major layout")
}
