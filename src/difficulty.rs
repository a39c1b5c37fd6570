//! Continuous, level-relative difficulty model.
//!
//! A layout's difficulty is derived from how far apart its pairs landed: the
//! mean Manhattan distance between the two cards of each symbol, normalized
//! by the largest distance the grid allows. The resulting score always falls
//! in `[0.9 * level, 1.0 * level]`, so it ranks layouts *within* a level
//! rather than across levels.

use ndarray::Array2;
use std::collections::HashMap;

use crate::{Card, GridShape, Pos};

pub const MIN_RANDOMNESS: f64 = 0.9;
pub const MAX_RANDOMNESS: f64 = 1.0;

/// Inclusive difficulty bounds for a given level.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DifficultyRange {
    pub min: f64,
    pub max: f64,
}

pub fn level_range(level: u32) -> DifficultyRange {
    let level = f64::from(level);
    DifficultyRange {
        min: level * MIN_RANDOMNESS,
        max: level * MAX_RANDOMNESS,
    }
}

/// Scores a generated layout for `level`.
pub fn score(level: u32, cards: &Array2<Card>, shape: GridShape) -> f64 {
    let mut positions: HashMap<&str, Vec<Pos>> = HashMap::new();
    for card in cards.iter() {
        positions.entry(card.symbol.as_str()).or_default().push(card.pos());
    }

    let max_dist = f64::from(shape.max_manhattan()).max(1.0);
    let mut total = 0.0;
    let mut pairs = 0u32;
    for pair in positions.values() {
        if let [a, b] = pair[..] {
            total += manhattan(a, b) / max_dist;
            pairs += 1;
        }
    }

    let avg_norm_dist = if pairs == 0 { 0.0 } else { total / f64::from(pairs) };
    let randomness = (avg_norm_dist / 10.0 + MIN_RANDOMNESS).clamp(MIN_RANDOMNESS, MAX_RANDOMNESS);
    round2(f64::from(level) * randomness)
}

/// Where `difficulty` sits inside its level's own range: 0 is the easiest
/// possible layout for that level, 1 the hardest.
pub fn position(difficulty: f64, level: u32) -> f64 {
    let range = level_range(level);
    if range.max <= range.min {
        return 0.0;
    }
    ((difficulty - range.min) / (range.max - range.min)).clamp(0.0, 1.0)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const GREEN: Rgb = Rgb { r: 0x34, g: 0xc7, b: 0x59 };
const YELLOW: Rgb = Rgb { r: 0xff, g: 0xcc, b: 0x00 };
const RED: Rgb = Rgb { r: 0xff, g: 0x3b, b: 0x30 };

/// Display color for a difficulty, relative to the level's own range.
///
/// Two linear segments: green to yellow over positions 0..0.5, yellow to red
/// over 0.5..1.
pub fn color(difficulty: f64, level: u32) -> Rgb {
    let pos = position(difficulty, level);
    if pos <= 0.5 {
        lerp(GREEN, YELLOW, pos / 0.5)
    } else {
        lerp(YELLOW, RED, (pos - 0.5) / 0.5)
    }
}

/// Legacy difficulty label on absolute thresholds.
///
/// Unlike [`position`] and [`color`], this ignores level-relative scaling: a
/// level-4 score of 3.8 is "Medium" here even though it may be the easiest
/// possible level-4 layout. Kept as-is for compatibility; callers wanting
/// consistent semantics should pass level context to the other helpers.
pub fn name(difficulty: f64) -> &'static str {
    if difficulty <= 3.0 {
        "Easy"
    } else if difficulty <= 6.0 {
        "Medium"
    } else if difficulty <= 10.0 {
        "Hard"
    } else if difficulty <= 15.0 {
        "Expert"
    } else {
        "Legendary"
    }
}

fn manhattan(a: Pos, b: Pos) -> f64 {
    f64::from(a.0.abs_diff(b.0) + a.1.abs_diff(b.1))
}

fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |from: u8, to: u8| {
        (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u8
    };
    Rgb {
        r: channel(from.r, to.r),
        g: channel(from.g, to.g),
        b: channel(from.b, to.b),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
