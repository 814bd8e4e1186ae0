use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniform placement by rejection sampling: draw a random `(row, col)` and keep it only if that cell is not a mine yet.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: GameConfig) -> Board {
        let size = if config.size == 0 {
            log::warn!("Board size must be positive, using a single cell");
            1
        } else {
            config.size
        };

        // at least one safe cell, otherwise sampling never terminates
        let max_mines = square(size) - 1;
        let mines = if config.mines > max_mines {
            log::warn!(
                "Too many mines, requested {} but only fits {}",
                config.mines,
                max_mines
            );
            max_mines
        } else {
            config.mines
        };

        let mut mine_mask: Array2<bool> = Array2::default(nd_index((size, size)));
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines_placed: CellCount = 0;
        let mut draws: u32 = 0;

        while mines_placed < mines {
            let coords: Coord2 = (rng.random_range(0..size), rng.random_range(0..size));
            draws += 1;

            let slot = &mut mine_mask[nd_index(coords)];
            if !*slot {
                *slot = true;
                mines_placed += 1;
            }
        }

        log::debug!(
            "placed {} mines on {}x{} board in {} draws",
            mines_placed,
            size,
            size,
            draws
        );
        Board::from_mine_mask(&mine_mask)
    }
}
