use serde::{Deserialize, Serialize};

use crate::types::{Coord, Pos};

/// A single cell of the card grid.
///
/// `is_revealed` means face-up but not yet confirmed; `is_matched` means
/// confirmed and permanently out of play. A matched card counts as face-up
/// for display regardless of `is_revealed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub row: Coord,
    pub col: Coord,
    pub symbol: String,
    pub is_revealed: bool,
    pub is_matched: bool,
}

impl Card {
    pub fn new(row: Coord, col: Coord, symbol: String) -> Self {
        Self {
            row,
            col,
            symbol,
            is_revealed: false,
            is_matched: false,
        }
    }

    pub const fn pos(&self) -> Pos {
        (self.row, self.col)
    }

    pub const fn is_face_up(&self) -> bool {
        self.is_revealed || self.is_matched
    }

    /// Whether the card can still enter a selection.
    pub const fn is_selectable(&self) -> bool {
        !self.is_revealed && !self.is_matched
    }
}
