use super::game::Game;
use super::history::History;
use super::piece::Board;
use super::piece::Piece;
use super::player::Player;
use crate::Action;
use crate::Mask;
use crate::Value;

pub const PTG_WIDTH: usize = 6;
pub const PTG_CELLS: usize = PTG_WIDTH * PTG_WIDTH;
pub const PTG_QUADS: usize = 4;
pub const PTG_DIRS: usize = 2;
pub const PTG_ACTIONS: usize = PTG_CELLS * PTG_QUADS * PTG_DIRS;

/// top-left cell of each 3x3 quadrant, numbered
///   0 1
///   2 3
const QUAD_ANCHORS: [usize; PTG_QUADS] = [0, 3, 18, 21];

/// pentago on the 6x6 grid split into four 3x3 quadrants. an action
/// places a piece and then rotates one quadrant a quarter turn in
/// one direction, encoded as direction * 144 + quadrant * 36 + cell.
/// a placement that completes five in a row on its own ends the game
/// immediately and the rotation is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Pentago {
    board: Board,
    player: Player,
    winner: Player,
    over: bool,
    mask: Mask,
}

pub fn encode(direction: usize, quadrant: usize, cell: usize) -> Action {
    debug_assert!(direction < PTG_DIRS && quadrant < PTG_QUADS && cell < PTG_CELLS);
    direction * PTG_CELLS * PTG_QUADS + quadrant * PTG_CELLS + cell
}

pub fn decode(action: Action) -> (usize, usize, usize) {
    debug_assert!(action < PTG_ACTIONS);
    (
        action / (PTG_CELLS * PTG_QUADS),
        (action / PTG_CELLS) % PTG_QUADS,
        action % PTG_CELLS,
    )
}

fn index(row: usize, col: usize) -> usize {
    row * PTG_WIDTH + col
}

/// rotate one quadrant a quarter turn in place. the corner cycle and
/// the edge cycle are hardcoded against the anchor (top-left) index.
fn rotate(board: &mut Board, quadrant: usize, clockwise: bool) {
    let a = QUAD_ANCHORS[quadrant];
    let corners = [a, a + 2, a + 14, a + 12];
    let edges = [a + 1, a + 8, a + 13, a + 6];
    for cycle in [corners, edges] {
        let [p, q, r, s] = cycle;
        if clockwise {
            let temp = board[p];
            board[p] = board[s];
            board[s] = board[r];
            board[r] = board[q];
            board[q] = temp;
        } else {
            let temp = board[p];
            board[p] = board[q];
            board[q] = board[r];
            board[r] = board[s];
            board[s] = temp;
        }
    }
}

/// whether the piece just placed at (row, col) completes five in a
/// row, checked before any rotation along the four lines through it
fn places_five(board: &Board, row: usize, col: usize, piece: Piece) -> bool {
    let deltas = [(0i32, 1i32), (1, 0), (1, 1), (1, -1)];
    deltas.iter().any(|&(dr, dc)| {
        let mut run = 1;
        for sign in [1i32, -1i32] {
            let mut r = row as i32 + dr * sign;
            let mut c = col as i32 + dc * sign;
            while r >= 0
                && r < PTG_WIDTH as i32
                && c >= 0
                && c < PTG_WIDTH as i32
                && board[index(r as usize, c as usize)] == piece
            {
                run += 1;
                r += dr * sign;
                c += dc * sign;
            }
        }
        run >= 5
    })
}

/// whole-board scan for five in a row, one flag per player.
/// used after rotations, which can complete lines anywhere
/// (including for both players at once).
fn wins(board: &Board) -> (bool, bool) {
    let mut won = (false, false);
    let mut credit = |piece: Piece| match piece {
        Piece::Zero => won.0 = true,
        Piece::One => won.1 = true,
        Piece::Empty => {}
    };
    // a horizontal five owns cols 1..=4 plus col 0 or col 5
    for row in 0..PTG_WIDTH {
        let piece = board[index(row, 1)];
        if piece == Piece::Empty {
            continue;
        }
        if (2..5).all(|col| board[index(row, col)] == piece)
            && (board[index(row, 0)] == piece || board[index(row, 5)] == piece)
        {
            credit(piece);
        }
    }
    // likewise vertically
    for col in 0..PTG_WIDTH {
        let piece = board[index(1, col)];
        if piece == Piece::Empty {
            continue;
        }
        if (2..5).all(|row| board[index(row, col)] == piece)
            && (board[index(0, col)] == piece || board[index(5, col)] == piece)
        {
            credit(piece);
        }
    }
    // the eight diagonal five-runs, checked exhaustively
    for row in 0..2 {
        for col in 0..2 {
            let piece = board[index(row, col)];
            if piece != Piece::Empty && (1..5).all(|i| board[index(row + i, col + i)] == piece) {
                credit(piece);
            }
        }
        for col in 4..PTG_WIDTH {
            let piece = board[index(row, col)];
            if piece != Piece::Empty && (1..5).all(|i| board[index(row + i, col - i)] == piece) {
                credit(piece);
            }
        }
    }
    won
}

/// every empty cell is a legal placement under all eight rotations
fn placements(board: &Board) -> Mask {
    let mut mask = vec![false; PTG_ACTIONS];
    for cell in 0..PTG_CELLS {
        if board[cell] == Piece::Empty {
            for choice in 0..PTG_DIRS * PTG_QUADS {
                mask[cell + choice * PTG_CELLS] = true;
            }
        }
    }
    mask
}

impl Game for Pentago {
    const ROWS: usize = PTG_WIDTH;
    const COLS: usize = PTG_WIDTH;
    const CELLS: usize = PTG_CELLS;
    const ACTIONS: usize = PTG_ACTIONS;
    const HISTORY: usize = 1;

    fn root() -> Self {
        Self {
            board: vec![Piece::Empty; PTG_CELLS],
            player: Player::Zero,
            winner: Player::None,
            over: false,
            mask: vec![true; PTG_ACTIONS],
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
        let (direction, quadrant, cell) = decode(action);
        let mut board = self.board.clone();
        let piece = Piece::from(self.player);
        board[cell] = piece;
        let (winner, over) = if places_five(&board, cell / PTG_WIDTH, cell % PTG_WIDTH, piece) {
            // the bare placement already wins; the rotation is skipped
            (self.player, true)
        } else {
            rotate(&mut board, quadrant, direction == 0);
            match wins(&board) {
                (true, true) => (Player::None, true),
                (true, false) => (Player::Zero, true),
                (false, true) => (Player::One, true),
                (false, false) => {
                    let filled = board.iter().all(|&p| p != Piece::Empty);
                    (Player::None, filled)
                }
            }
        };
        let mask = if over { vec![false; PTG_ACTIONS] } else { placements(&board) };
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

impl std::fmt::Display for Pentago {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in 0..PTG_WIDTH {
            for col in 0..PTG_WIDTH {
                write!(f, "{} ", self.board[index(row, col)].glyph())?;
                if col == 2 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
            if row == 2 {
                writeln!(f)?;
            }
        }
        writeln!(f, "to move: {}", self.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_codec_roundtrips() {
        for action in [0, 35, 36, 143, 144, 287] {
            let (direction, quadrant, cell) = decode(action);
            assert!(encode(direction, quadrant, cell) == action);
        }
        assert!(decode(287) == (1, 3, 35));
    }

    #[test]
    fn rotation_cycles_have_order_four() {
        let mut board = vec![Piece::Empty; PTG_CELLS];
        board[index(0, 0)] = Piece::Zero;
        board[index(1, 2)] = Piece::One;
        let start = board.clone();
        for _ in 0..4 {
            rotate(&mut board, 0, true);
        }
        assert!(board == start);
        rotate(&mut board, 0, true);
        rotate(&mut board, 0, false);
        assert!(board == start);
    }

    #[test]
    fn placement_win_skips_the_rotation() {
        let mut node = Pentago::root();
        // Zero builds cells 0..4 of row 0; One answers inside the
        // bottom-left quadrant. every move rotates the bottom-right
        // quadrant, which stays empty, so rotations are identities.
        for (zero, one) in [(0, 18), (1, 20), (2, 24), (3, 26)] {
            node = node.apply(encode(0, 3, zero));
            node = node.apply(encode(0, 3, one));
        }
        // the fifth piece at (0, 4) wins on placement and the move
        // short-circuits before rotating
        let done = node.apply(encode(0, 3, 4));
        assert!(done.over());
        assert!(done.winner() == Player::Zero);
        assert!(done.rewards() == (1.0, -1.0));
        assert!((0..5).all(|col| done.board[index(0, col)] == Piece::Zero));
        assert!(done.mask().iter().all(|&legal| !legal));
    }

    #[test]
    fn rotation_completes_the_line() {
        let mut node = Pentago::root();
        // Zero stacks column 0 of the top-left quadrant and parks two
        // stones at (5, 0) and (5, 1); One stays in the top-right
        // quadrant. interim rotations spin the empty bottom-right.
        for (zero, one) in [(0, 3), (6, 5), (12, 9), (30, 11), (31, 16)] {
            node = node.apply(encode(0, 3, zero));
            node = node.apply(encode(0, 3, one));
        }
        // the final placement is harmless, but rotating the bottom-left
        // quadrant clockwise carries (5,0) to (3,0) and (5,1) to (4,0),
        // completing column 0
        let done = node.apply(encode(0, 2, 35));
        assert!(done.over());
        assert!(done.winner() == Player::Zero);
        assert!((0..5).all(|row| done.board[index(row, 0)] == Piece::Zero));
    }

    #[test]
    fn simultaneous_fives_draw() {
        let mut board = vec![Piece::Empty; PTG_CELLS];
        for col in 0..5 {
            board[index(0, col)] = Piece::Zero;
            board[index(5, col)] = Piece::One;
        }
        assert!(wins(&board) == (true, true));
    }

    #[test]
    fn mask_tracks_empty_cells() {
        let node = Pentago::root().apply(encode(1, 2, 14));
        let legal = node.mask().iter().filter(|&&x| x).count();
        assert!(legal == (PTG_CELLS - 1) * PTG_QUADS * PTG_DIRS);
        assert!((0..8).all(|choice| !node.mask()[14 + choice * PTG_CELLS]));
    }
}
