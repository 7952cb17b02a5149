use super::piece::Board;
use super::piece::Piece;
use super::player::Player;

/// the network input: the last boards along the line of play,
/// most recent first, plus the side to move. games with no
/// history requirement carry a single board. consumers pad
/// short histories with empty channels.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    boards: Vec<Board>,
    player: Player,
}

impl History {
    pub fn new(boards: Vec<Board>, player: Player) -> Self {
        debug_assert!(!boards.is_empty());
        Self { boards, player }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// channel embedding fed to the network and dumped to disk:
    /// one (side-to-move stones, opponent stones) bitmap pair per
    /// historical ply, zero channels padding out to `history` plies,
    /// then one constant plane of 1.0 iff Player::Zero is to move.
    /// yields (2 * history + 1) * cells values.
    pub fn planes(&self, cells: usize, history: usize) -> Vec<f32> {
        let ours = Piece::from(self.player);
        let mut planes = Vec::with_capacity((2 * history + 1) * cells);
        for board in self.boards.iter().take(history) {
            debug_assert!(board.len() == cells);
            for piece in [ours, ours.other()] {
                planes.extend(board.iter().map(|&p| if p == piece { 1.0 } else { 0.0 }));
            }
        }
        planes.resize(2 * history * cells, 0.0);
        let color = if self.player == Player::Zero { 1.0 } else { 0.0 };
        planes.resize(2 * history * cells + cells, color);
        planes
    }
}
