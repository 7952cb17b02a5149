use super::game::Game;
use super::history::History;
use super::piece::Board;
use super::piece::Piece;
use super::player::Player;
use crate::Action;
use crate::Mask;
use crate::Value;

pub const C4_ROWS: usize = 6;
pub const C4_COLS: usize = 7;
pub const C4_CELLS: usize = C4_ROWS * C4_COLS;

/// connect four on the standard 6x7 grid. an action is a column;
/// the piece settles in the lowest empty row. row 0 is the top row,
/// so "lowest" means the highest row index.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectFour {
    board: Board,
    player: Player,
    winner: Player,
    over: bool,
    mask: Mask,
}

fn index(row: usize, col: usize) -> usize {
    row * C4_COLS + col
}

/// whether the piece just placed at (row, col) completes four in a row.
/// only the four lines through the placed piece can have changed.
fn connects(board: &Board, row: usize, col: usize, piece: Piece) -> bool {
    let deltas = [(0i32, 1i32), (1, 0), (1, 1), (1, -1)];
    deltas.iter().any(|&(dr, dc)| {
        let mut run = 1;
        for sign in [1i32, -1i32] {
            let mut r = row as i32 + dr * sign;
            let mut c = col as i32 + dc * sign;
            while r >= 0
                && r < C4_ROWS as i32
                && c >= 0
                && c < C4_COLS as i32
                && board[index(r as usize, c as usize)] == piece
            {
                run += 1;
                r += dr * sign;
                c += dc * sign;
            }
        }
        run >= 4
    })
}

/// columns whose top cell is empty accept a piece
fn open_columns(board: &Board) -> Mask {
    (0..C4_COLS)
        .map(|col| board[index(0, col)] == Piece::Empty)
        .collect()
}

impl Game for ConnectFour {
    const ROWS: usize = C4_ROWS;
    const COLS: usize = C4_COLS;
    const CELLS: usize = C4_CELLS;
    const ACTIONS: usize = C4_COLS;
    const HISTORY: usize = 1;

    fn root() -> Self {
        Self {
            board: vec![Piece::Empty; C4_CELLS],
            player: Player::Zero,
            winner: Player::None,
            over: false,
            mask: vec![true; C4_COLS],
        }
    }

    fn turn(&self) -> Player {
        self.player
    }

    fn winner(&self) -> Player {
        self.winner
    }

    fn over(&self) -> bool {
        self.over
    }

    fn mask(&self) -> &Mask {
        &self.mask
    }

    fn apply(&self, action: Action) -> Self {
        debug_assert!(!self.over);
        debug_assert!(self.mask[action]);
        let mut board = self.board.clone();
        let piece = Piece::from(self.player);
        let row = (0..C4_ROWS)
            .rev()
            .find(|&row| board[index(row, action)] == Piece::Empty)
            .expect("column has an empty cell");
        board[index(row, action)] = piece;
        let winner = if connects(&board, row, action, piece) {
            self.player
        } else {
            Player::None
        };
        let filled = (0..C4_COLS).all(|col| board[index(0, col)] != Piece::Empty);
        let over = winner != Player::None || filled;
        let mask = if over { vec![false; C4_COLS] } else { open_columns(&board) };
        Self {
            board,
            player: self.player.other(),
            winner,
            over,
            mask,
        }
    }

    fn rewards(&self) -> (Value, Value) {
        match self.winner {
            Player::Zero => (1.0, -1.0),
            Player::One => (-1.0, 1.0),
            Player::None => (0.0, 0.0),
        }
    }

    fn history(&self) -> History {
        History::new(vec![self.board.clone()], self.player)
    }
}

impl std::fmt::Display for ConnectFour {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in 0..C4_ROWS {
            for col in 0..C4_COLS {
                write!(f, "{} ", self.board[index(row, col)].glyph())?;
            }
            writeln!(f)?;
        }
        for col in 0..C4_COLS {
            write!(f, "{} ", col)?;
        }
        writeln!(f)?;
        writeln!(f, "to move: {}", self.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(actions: &[Action]) -> ConnectFour {
        actions
            .iter()
            .fold(ConnectFour::root(), |node, &action| node.apply(action))
    }

    #[test]
    fn forced_win_for_player_zero() {
        let node = play(&[3, 3, 4, 4, 2, 3, 1]);
        assert!(node.over());
        assert!(node.winner() == Player::Zero);
        assert!(node.rewards() == (1.0, -1.0));
        assert!(node.mask().iter().all(|&legal| !legal));
    }

    #[test]
    fn mask_counts_open_columns() {
        let mut node = ConnectFour::root();
        for _ in 0..C4_ROWS {
            node = node.apply(3);
        }
        assert!(!node.over());
        assert!(node.mask().iter().filter(|&&legal| legal).count() == C4_COLS - 1);
        assert!(!node.mask()[3]);
    }

    #[test]
    fn full_board_without_connection_draws() {
        // columns alternate vertically; the bottom-row pattern has no
        // three adjacent alternations, so no diagonal reaches four
        let starts = [
            Piece::Zero,
            Piece::Zero,
            Piece::One,
            Piece::One,
            Piece::Zero,
            Piece::Zero,
            Piece::One,
        ];
        let mut board = vec![Piece::Empty; C4_CELLS];
        for col in 0..C4_COLS {
            for row in 0..C4_ROWS {
                let below = C4_ROWS - 1 - row;
                board[index(row, col)] = if below % 2 == 0 {
                    starts[col]
                } else {
                    starts[col].other()
                };
            }
        }
        for row in 0..C4_ROWS {
            for col in 0..C4_COLS {
                let piece = board[index(row, col)];
                assert!(!connects(&board, row, col, piece));
            }
        }
        let node = ConnectFour {
            board,
            player: Player::Zero,
            winner: Player::None,
            over: true,
            mask: vec![false; C4_COLS],
        };
        assert!(node.rewards() == (0.0, 0.0));
    }

    #[test]
    fn apply_is_pure() {
        let node = play(&[3, 3]);
        assert!(node.apply(4) == node.apply(4));
    }
}
