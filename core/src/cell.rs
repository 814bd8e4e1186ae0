use serde::{Deserialize, Serialize};

/// One grid position of the minefield.
///
/// `is_mine` and `adjacent_mines` are fixed once the board is generated, `is_revealed` only ever goes from `false` to
/// `true`, and `is_flagged` can only be set while the cell is still hidden.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub adjacent_mines: u8,
}

impl Cell {
    pub const fn is_hidden(self) -> bool {
        !self.is_revealed
    }

    pub const fn view(self) -> CellView {
        match self {
            Self {
                is_revealed: false,
                is_flagged: true,
                ..
            } => CellView::Flagged,
            Self {
                is_revealed: false, ..
            } => CellView::Hidden,
            Self { is_mine: true, .. } => CellView::Mine,
            Self { adjacent_mines, .. } => CellView::Revealed(adjacent_mines),
        }
    }
}

/// What a player is allowed to see of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}
