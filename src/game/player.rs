use super::piece::Piece;

/// the side to move, the winner of a finished game, or nobody.
/// drawn games and unfinished games both report Player::None as winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Zero,
    One,
    None,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
            Player::None => Player::None,
        }
    }
}

/// Piece isomorphism, defined where the piece belongs to a player
impl From<Piece> for Player {
    fn from(piece: Piece) -> Self {
        match piece {
            Piece::Zero => Player::Zero,
            Piece::One => Player::One,
            Piece::Empty => Player::None,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Player::Zero => write!(f, "0"),
            Player::One => write!(f, "1"),
            Player::None => write!(f, "-"),
        }
    }
}
