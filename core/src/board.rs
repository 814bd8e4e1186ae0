use alloc::collections::VecDeque;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square minefield. The mine layout and adjacency counts are fixed at construction; only the reveal and flag state
/// of cells changes afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Board {
    /// Builds a board from a square mine mask, computing adjacency counts for every safe cell.
    pub(crate) fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let mut cells: Array2<Cell> = Array2::default(mine_mask.dim());
        let mut mine_count: CellCount = 0;
        let size = mine_mask.nrows() as Coord;

        for ((row, col), &is_mine) in mine_mask.indexed_iter() {
            let coords = (row as Coord, col as Coord);
            let cell = &mut cells[nd_index(coords)];
            cell.is_mine = is_mine;
            if is_mine {
                mine_count += 1;
            } else {
                cell.adjacent_mines = neighbors(coords, size)
                    .filter(|&pos| mine_mask[nd_index(pos)])
                    .count() as u8;
            }
        }

        Self { cells, mine_count }
    }

    /// Fixed layout, duplicate coordinates collapse into one mine.
    pub fn from_mine_coords(size: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        if size == 0 {
            return Err(GameError::InvalidSize);
        }

        let mut mine_mask: Array2<bool> = Array2::default(nd_index((size, size)));
        for &coords in mine_coords {
            if coords.0 >= size || coords.1 >= size {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[nd_index(coords)] = true;
        }

        let board = Self::from_mine_mask(&mine_mask);
        if board.mine_count >= square(size) {
            return Err(GameError::TooManyMines);
        }
        Ok(board)
    }

    pub fn size(&self) -> Coord {
        self.cells.nrows() as Coord
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn contains(&self, (row, col): Coord2) -> bool {
        let size = self.size();
        row < size && col < size
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self[coords]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.size())
    }

    /// All cells in row-major order together with their coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    pub fn revealed_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_revealed).count() as CellCount
    }

    pub fn flagged_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_flagged).count() as CellCount
    }

    pub fn mine_revealed(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_mine && cell.is_revealed)
    }

    /// Counted from scratch on every call.
    pub fn check_win(&self) -> bool {
        !self.mine_revealed() && self.revealed_count() == self.safe_cell_count()
    }

    /// Reveals a cell, cascading through connected zero-count cells.
    ///
    /// Revealed and flagged cells are left alone, both at `coords` and during the cascade. The cascade is a worklist
    /// traversal, each cell is revealed at most once.
    ///
    /// # Panics
    ///
    /// If `coords` is outside the board.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        assert!(self.contains(coords), "reveal out of bounds: {coords:?}");

        let start = self[coords];
        if start.is_revealed || start.is_flagged {
            return RevealOutcome::NoChange;
        }

        if start.is_mine {
            self.cell_mut(coords).is_revealed = true;
            return RevealOutcome::HitMine;
        }

        let mut to_visit = VecDeque::from([coords]);
        while let Some(visit_coords) = to_visit.pop_front() {
            let cell = self.cell_mut(visit_coords);
            if cell.is_revealed || cell.is_flagged {
                continue;
            }
            cell.is_revealed = true;

            if cell.adjacent_mines == 0 {
                to_visit.extend(self.iter_neighbors(visit_coords).filter(|&pos| {
                    let neighbor = self[pos];
                    !neighbor.is_revealed && !neighbor.is_flagged
                }));
            }
        }

        RevealOutcome::Revealed
    }

    /// # Panics
    ///
    /// If `coords` is outside the board.
    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        assert!(self.contains(coords), "flag out of bounds: {coords:?}");

        let cell = self.cell_mut(coords);
        if cell.is_revealed {
            return MarkOutcome::NoChange;
        }
        cell.is_flagged = !cell.is_flagged;
        MarkOutcome::Changed
    }

    fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[nd_index(coords)]
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[nd_index(coords)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;

    fn board(size: Coord, mines: &[Coord2]) -> Board {
        Board::from_mine_coords(size, mines).unwrap()
    }

    fn revealed_set(board: &Board) -> BTreeSet<Coord2> {
        board
            .iter_cells()
            .filter(|(_, cell)| cell.is_revealed)
            .map(|(coords, _)| coords)
            .collect()
    }

    fn brute_force_count(board: &Board, (row, col): Coord2) -> u8 {
        let mut count = 0;
        for r in row.saturating_sub(1)..=row.saturating_add(1) {
            for c in col.saturating_sub(1)..=col.saturating_add(1) {
                if (r, c) != (row, col) && board.contains((r, c)) && board[(r, c)].is_mine {
                    count += 1;
                }
            }
        }
        count
    }

    /// Zero region reachable from `start` plus its numbered border, computed recursively.
    fn expected_flood(board: &Board, start: Coord2) -> BTreeSet<Coord2> {
        fn visit(board: &Board, coords: Coord2, seen: &mut BTreeSet<Coord2>) {
            if !seen.insert(coords) || board[coords].adjacent_mines > 0 {
                return;
            }
            for neighbor in board.iter_neighbors(coords) {
                visit(board, neighbor, seen);
            }
        }
        let mut seen = BTreeSet::new();
        visit(board, start, &mut seen);
        seen
    }

    #[test]
    fn adjacency_counts_match_brute_force() {
        for seed in 0..32 {
            let board = RandomBoardGenerator::new(seed).generate(GameConfig::default());
            for (coords, cell) in board.iter_cells() {
                if !cell.is_mine {
                    assert_eq!(cell.adjacent_mines, brute_force_count(&board, coords));
                }
            }
        }
    }

    #[test]
    fn from_mine_coords_counts_and_validates() {
        let b = board(3, &[(0, 0), (0, 0), (2, 2)]);
        assert_eq!(b.mine_count(), 2);
        assert_eq!(b[(1, 1)].adjacent_mines, 2);
        assert_eq!(b[(0, 2)].adjacent_mines, 0);

        assert_eq!(
            Board::from_mine_coords(3, &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(Board::from_mine_coords(0, &[]), Err(GameError::InvalidSize));
        assert_eq!(
            Board::from_mine_coords(1, &[(0, 0)]),
            Err(GameError::TooManyMines)
        );
    }

    #[test]
    fn reveal_numbered_cell_does_not_cascade() {
        let mut b = board(3, &[(0, 0)]);

        assert_eq!(b.reveal((1, 1)), RevealOutcome::Revealed);
        assert_eq!(revealed_set(&b), BTreeSet::from([(1, 1)]));
    }

    #[test]
    fn reveal_mine_marks_only_that_cell() {
        let mut b = board(3, &[(0, 0)]);

        assert_eq!(b.reveal((0, 0)), RevealOutcome::HitMine);
        assert!(b.mine_revealed());
        assert_eq!(b.revealed_count(), 1);
        assert!(!b.check_win());
    }

    #[test]
    fn three_by_three_cascade_reveals_every_safe_cell() {
        let mut b = board(3, &[(0, 0)]);

        assert_eq!(b.reveal((2, 2)), RevealOutcome::Revealed);
        assert_eq!(b.revealed_count(), 8);
        assert!(!b[(0, 0)].is_revealed);
        assert!(b.check_win());
    }

    #[test]
    fn cascade_stops_at_numbered_border() {
        // mine wall down the middle column
        let wall: Vec<Coord2> = (0..5).map(|row| (row, 2)).collect();
        let mut b = board(5, &wall);

        b.reveal((0, 0));

        let expected: BTreeSet<Coord2> = (0..5).flat_map(|row| [(row, 0), (row, 1)]).collect();
        assert_eq!(revealed_set(&b), expected);
        assert!(!b.mine_revealed());
        assert!(!b.check_win());
    }

    #[test]
    fn cascade_matches_recursive_flood_on_random_boards() {
        for seed in 0..32 {
            let board = RandomBoardGenerator::new(seed).generate(GameConfig::default());
            let Some((start, _)) = board
                .iter_cells()
                .find(|(_, cell)| !cell.is_mine && cell.adjacent_mines == 0)
            else {
                continue;
            };

            let mut revealed = board.clone();
            revealed.reveal(start);

            assert_eq!(revealed_set(&revealed), expected_flood(&board, start));
            assert!(!revealed.mine_revealed());
        }
    }

    #[test]
    fn revealing_revealed_zero_cell_is_noop() {
        let mut b = board(4, &[(3, 3)]);
        b.reveal((0, 0));
        let before = b.clone();

        assert_eq!(b.reveal((0, 0)), RevealOutcome::NoChange);
        assert_eq!(b, before);
    }

    #[test]
    fn flagged_cell_blocks_reveal_until_unflagged() {
        let mut b = board(3, &[(0, 0)]);

        assert_eq!(b.toggle_flag((1, 1)), MarkOutcome::Changed);
        assert_eq!(b.reveal((1, 1)), RevealOutcome::NoChange);
        assert!(!b[(1, 1)].is_revealed);

        assert_eq!(b.toggle_flag((1, 1)), MarkOutcome::Changed);
        assert_eq!(b.reveal((1, 1)), RevealOutcome::Revealed);
    }

    #[test]
    fn cascade_skips_flagged_cells() {
        let mut b = board(3, &[(0, 0)]);
        b.toggle_flag((2, 0));

        b.reveal((2, 2));

        assert!(!b[(2, 0)].is_revealed);
        assert!(b[(2, 0)].is_flagged);
        assert_eq!(b.revealed_count(), 7);
        assert!(!b.check_win());
    }

    #[test]
    fn toggle_flag_on_revealed_cell_is_noop() {
        let mut b = board(3, &[(0, 0)]);
        b.reveal((1, 1));

        assert_eq!(b.toggle_flag((1, 1)), MarkOutcome::NoChange);
        assert!(!b[(1, 1)].is_flagged);
        assert_eq!(b.flagged_count(), 0);
    }

    #[test]
    fn check_win_requires_all_safe_cells() {
        let mut b = board(2, &[(0, 0)]);
        b.reveal((0, 1));
        b.reveal((1, 0));
        assert!(!b.check_win());

        b.reveal((1, 1));
        assert!(b.check_win());
    }

    #[test]
    fn check_win_is_false_once_a_mine_is_revealed() {
        let mut b = board(2, &[(0, 0)]);
        b.reveal((0, 1));
        b.reveal((1, 0));
        b.reveal((1, 1));
        b.reveal((0, 0));

        assert!(!b.check_win());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn reveal_out_of_bounds_panics() {
        board(3, &[]).reveal((3, 0));
    }
}
