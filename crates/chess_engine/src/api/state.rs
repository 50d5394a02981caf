//! Game state queries
//!
//! Check, checkmate and stalemate for either color. These are computed from
//! `valid_moves`, so they share its king-safety simulation and never recurse back into
//! themselves.

use crate::error::ChessEngineResult;
use crate::move_gen;
use crate::types::*;

impl Game {
    /// True iff any opposing piece can capture this color's king
    pub fn is_in_check(&self, color: Color) -> ChessEngineResult<bool> {
        move_gen::is_in_check(&self.board, color)
    }

    /// Every legal move available to `color`, piece by piece in board order
    pub fn legal_moves(&self, color: Color) -> ChessEngineResult<Vec<Move>> {
        let mut moves = Vec::new();
        for (from, _) in self.board.pieces(color) {
            moves.extend(self.valid_moves(from)?);
        }
        Ok(moves)
    }

    /// In check with no legal move
    pub fn is_in_checkmate(&self, color: Color) -> ChessEngineResult<bool> {
        Ok(self.is_in_check(color)? && !self.has_legal_move(color)?)
    }

    /// Not in check, yet no legal move
    pub fn is_in_stalemate(&self, color: Color) -> ChessEngineResult<bool> {
        Ok(!self.is_in_check(color)? && !self.has_legal_move(color)?)
    }

    /// Get current game state (playing, check, checkmate, stalemate) for `color`
    pub fn status(&self, color: Color) -> ChessEngineResult<GameStatus> {
        let in_check = self.is_in_check(color)?;
        let has_legal_moves = self.has_legal_move(color)?;

        Ok(match (in_check, has_legal_moves) {
            (true, false) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Playing,
        })
    }

    fn has_legal_move(&self, color: Color) -> ChessEngineResult<bool> {
        for (from, _) in self.board.pieces(color) {
            if !self.valid_moves(from)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
