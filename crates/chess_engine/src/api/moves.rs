//! Move validation and execution
//!
//! Functions for filtering pseudo-legal moves down to legal ones and applying a move to
//! the authoritative board.

use crate::error::{ChessEngineError, ChessEngineResult};
use crate::move_gen::{is_in_check, piece_moves};
use crate::types::*;

impl Game {
    /// Legal moves of the piece on `from`
    ///
    /// Each pseudo-legal candidate is simulated on a cloned board and dropped if it
    /// leaves the mover's own king in check. Returns an empty list if the square is
    /// empty. Turn and the terminal flag are not consulted.
    pub fn valid_moves(&self, from: Position) -> ChessEngineResult<Vec<Move>> {
        let Some(piece) = self.board.piece_at(from) else {
            return Ok(Vec::new());
        };

        let mut legal = Vec::new();
        for mv in piece_moves(&self.board, from) {
            if !self.leaves_king_in_check(&mv, piece.color)? {
                legal.push(mv);
            }
        }
        Ok(legal)
    }

    /// Check if a move is legal for the piece standing on its start square
    pub fn is_legal_move(&self, mv: &Move) -> ChessEngineResult<bool> {
        Ok(self.valid_moves(mv.start)?.contains(mv))
    }

    /// Validate and apply a move
    ///
    /// Checks, in order: the game is not over, a piece stands on `start`, that piece
    /// belongs to the side to move, the destination is reachable, and the promotion
    /// piece is present exactly when a pawn reaches the farthest rank. On success the
    /// piece moves (capturing by overwrite), the turn flips, and the status of the side
    /// now to move is returned. Checkmate or stalemate marks the game over.
    ///
    /// The game is left untouched on any error.
    ///
    /// # Errors
    ///
    /// `GameOver`, `NoPieceAtSquare`, `WrongTurn`, `IllegalMove`, `MissingPromotion`,
    /// `InvalidPromotion`, or `InvalidBoardState` for a corrupted position.
    pub fn make_move(&mut self, mv: &Move) -> ChessEngineResult<GameStatus> {
        if self.game_over {
            return Err(ChessEngineError::GameOver);
        }

        let piece = self
            .board
            .piece_at(mv.start)
            .ok_or(ChessEngineError::NoPieceAtSquare { square: mv.start })?;

        if piece.color != self.turn {
            return Err(ChessEngineError::WrongTurn {
                square: mv.start,
                color: piece.color,
                turn: self.turn,
            });
        }

        let legal = self.valid_moves(mv.start)?;
        if !legal.iter().any(|m| m.end == mv.end) {
            return Err(ChessEngineError::IllegalMove {
                from: mv.start,
                to: mv.end,
            });
        }
        check_promotion(piece, mv)?;
        if !legal.contains(mv) {
            return Err(ChessEngineError::IllegalMove {
                from: mv.start,
                to: mv.end,
            });
        }

        let mut next = self.clone();
        next.board.apply(mv);
        next.turn = self.turn.opponent();
        let status = next.status(next.turn)?;
        if status.is_terminal() {
            next.game_over = true;
        }

        *self = next;
        Ok(status)
    }

    fn leaves_king_in_check(&self, mv: &Move, color: Color) -> ChessEngineResult<bool> {
        let mut simulated = self.board.clone();
        simulated.apply(mv);
        is_in_check(&simulated, color)
    }
}

/// A pawn landing on the farthest rank must name a queen, rook, bishop or knight;
/// any other move must not name a promotion at all.
fn check_promotion(piece: Piece, mv: &Move) -> ChessEngineResult<()> {
    let must_promote = piece.kind == PieceType::Pawn && mv.end.row() == piece.color.promotion_row();

    match (must_promote, mv.promotion) {
        (true, None) => Err(ChessEngineError::MissingPromotion {
            from: mv.start,
            to: mv.end,
        }),
        (true, Some(kind)) if kind.is_promotion_target() => Ok(()),
        (false, None) => Ok(()),
        _ => Err(ChessEngineError::InvalidPromotion {
            from: mv.start,
            to: mv.end,
        }),
    }
}
