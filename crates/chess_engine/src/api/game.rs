//! Game lifecycle management

use crate::board::Board;
use crate::types::*;

impl Game {
    /// Create a new game with the standard opening position, White to move
    pub fn new() -> Self {
        Game::from_board(Board::standard(), Color::White)
    }

    /// Start from an arbitrary position
    pub fn from_board(board: Board, turn: Color) -> Self {
        Game {
            board,
            turn,
            game_over: false,
        }
    }

    /// Reset the game to starting position
    pub fn reset(&mut self) {
        *self = Game::new();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Mark the game as finished (checkmate, stalemate or resignation)
    pub fn set_game_over(&mut self) {
        self.game_over = true;
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
