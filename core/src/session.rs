use serde::{Deserialize, Serialize};

use crate::*;

/// Outcome of a round, always derived from the board and never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Lost,
    Won,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game round over a single board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    board: Board,
}

impl GameSession {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn generate<G: BoardGenerator>(generator: G, config: GameConfig) -> Self {
        Self::new(generator.generate(config))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        if self.board.mine_revealed() {
            GameStatus::Lost
        } else if self.board.check_win() {
            GameStatus::Won
        } else {
            GameStatus::Playing
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_finished()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_not_finished()?;

        let mut next = self.board.clone();
        let outcome = match next.reveal(coords) {
            RevealOutcome::Revealed if next.check_win() => RevealOutcome::Won,
            outcome => outcome,
        };
        self.commit(next, outcome.has_update());

        log::debug!("reveal {:?}: {:?}", coords, outcome);
        Ok(outcome)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_not_finished()?;

        let mut next = self.board.clone();
        let outcome = next.toggle_flag(coords);
        self.commit(next, outcome.has_update());

        log::debug!("flag {:?}: {:?}", coords, outcome);
        Ok(outcome)
    }

    fn commit(&mut self, next: Board, changed: bool) {
        if changed {
            self.board = next;
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord, mines: &[Coord2]) -> GameSession {
        GameSession::new(Board::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn reveal_hits_mine_and_loses() {
        let mut game = session(2, &[(0, 0)]);

        assert_eq!(game.reveal((0, 0)), Ok(RevealOutcome::HitMine));
        assert_eq!(game.status(), GameStatus::Lost);
        assert!(game.board()[(0, 0)].is_revealed);
    }

    #[test]
    fn cascade_to_last_safe_cell_wins() {
        let mut game = session(3, &[(0, 0)]);

        assert_eq!(game.reveal((2, 2)), Ok(RevealOutcome::Won));
        assert_eq!(game.status(), GameStatus::Won);
        assert!(!game.board()[(0, 0)].is_revealed);
    }

    #[test]
    fn finished_session_rejects_moves() {
        let mut game = session(2, &[(0, 0)]);
        game.reveal((0, 0)).unwrap();
        let before = game.clone();

        assert_eq!(game.reveal((1, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(game.toggle_flag((1, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(game, before);
    }

    #[test]
    fn out_of_bounds_is_an_error_not_a_panic() {
        let mut game = session(2, &[(0, 0)]);

        assert_eq!(game.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.toggle_flag((0, 9)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn noop_moves_leave_board_untouched() {
        let mut game = session(3, &[(0, 0)]);
        game.reveal((1, 1)).unwrap();
        let before = game.clone();

        assert_eq!(game.reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(game.toggle_flag((1, 1)), Ok(MarkOutcome::NoChange));
        assert_eq!(game, before);
    }

    #[test]
    fn flag_then_unflag() {
        let mut game = session(3, &[(0, 0)]);

        assert_eq!(game.toggle_flag((0, 0)), Ok(MarkOutcome::Changed));
        assert!(game.board()[(0, 0)].is_flagged);
        assert_eq!(game.reveal((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(game.status(), GameStatus::Playing);

        assert_eq!(game.toggle_flag((0, 0)), Ok(MarkOutcome::Changed));
        assert!(!game.board()[(0, 0)].is_flagged);
    }
}
