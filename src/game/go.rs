use super::dsu::Dsu;
use super::game::Game;
use super::history::History;
use super::piece::Board;
use super::piece::Piece;
use super::player::Player;
use super::zobrist::Zobrist;
use crate::Action;
use crate::GO_KOMI;
use crate::Mask;
use crate::Value;
use crate::ZOBRIST_SEED;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::LazyLock;

pub const GO_WIDTH: usize = 7;
pub const GO_CELLS: usize = GO_WIDTH * GO_WIDTH;
pub const GO_ACTIONS: usize = GO_CELLS + 1;
pub const GO_PASS: Action = GO_CELLS;
pub const GO_HISTORY: usize = 8;

/// per-(cell, piece) hash constants, process-wide and seeded so that
/// every worker of a run computes identical hashes
static ZOBRIST: LazyLock<Zobrist> = LazyLock::new(|| Zobrist::new(GO_CELLS * 2, ZOBRIST_SEED));

fn constant(cell: usize, piece: Piece) -> u64 {
    let offset = match piece {
        Piece::Zero => 0,
        Piece::One => GO_CELLS,
        Piece::Empty => unreachable!("empty cells do not hash"),
    };
    ZOBRIST.constant(cell + offset)
}

fn neighbors(cell: usize) -> Vec<usize> {
    let row = cell / GO_WIDTH;
    let col = cell % GO_WIDTH;
    let mut cells = Vec::with_capacity(4);
    if row > 0 {
        cells.push(cell - GO_WIDTH);
    }
    if col > 0 {
        cells.push(cell - 1);
    }
    if row < GO_WIDTH - 1 {
        cells.push(cell + GO_WIDTH);
    }
    if col < GO_WIDTH - 1 {
        cells.push(cell + 1);
    }
    cells
}

/// go on the 7x7 grid under tromp-taylor-style rules: positional
/// super-ko (no move may recreate any whole-board position seen on
/// the path from the root), suicide illegal, pass always legal at
/// index 49. two consecutive passes end the game, as does reaching
/// 2 * 49 plies. stones and exclusively-bordered empty regions score
/// a point each; white receives GO_KOMI.
///
/// groups are tracked incrementally: a union-find over cells with
/// per-representative liberty counts and component hashes, a running
/// whole-board hash, and the set of hashes seen along the path.
#[derive(Debug, Clone)]
pub struct Go {
    board: Board,
    player: Player,
    winner: Player,
    over: bool,
    mask: Mask,
    last: Option<Action>,
    depth: usize,
    hash: u64,
    seen: HashSet<u64>,
    dsu: Dsu,
    liberties: Vec<i32>,
    components: Vec<u64>,
    recent: VecDeque<Board>,
}

impl Go {
    fn liberties_of(&self, cell: usize) -> i32 {
        self.liberties[self.dsu.find(cell)]
    }

    fn component_of(&self, cell: usize) -> u64 {
        self.components[self.dsu.find(cell)]
    }

    /// count the distinct empty neighbors of the group containing
    /// `cell` by flooding it. marking empties as visited keeps each
    /// liberty counted once.
    fn flood_liberties(&self, cell: usize) -> i32 {
        let piece = self.board[cell];
        debug_assert!(piece != Piece::Empty);
        let mut visited = vec![false; GO_CELLS];
        let mut queue = VecDeque::from([cell]);
        visited[cell] = true;
        let mut liberties = 0;
        while let Some(current) = queue.pop_front() {
            for neighbor in neighbors(current) {
                if visited[neighbor] {
                    continue;
                }
                visited[neighbor] = true;
                if self.board[neighbor] == piece {
                    queue.push_back(neighbor);
                } else if self.board[neighbor] == Piece::Empty {
                    liberties += 1;
                }
            }
        }
        liberties
    }

    /// remove the dead group containing `cell`. every removed stone
    /// grants one liberty to each distinct adjacent enemy group.
    fn clear(&mut self, cell: usize, piece: Piece) {
        debug_assert!(self.board[cell] == piece);
        self.board[cell] = Piece::Empty;
        self.dsu.reset(cell);
        self.liberties[cell] = 0;
        self.components[cell] = 0;
        let mut adjacent = Vec::with_capacity(4);
        for neighbor in neighbors(cell) {
            if self.board[neighbor] == piece {
                self.clear(neighbor, piece);
            } else if self.board[neighbor] != Piece::Empty {
                let group = self.dsu.find(neighbor);
                if !adjacent.contains(&group) {
                    adjacent.push(group);
                    self.liberties[group] += 1;
                }
            }
        }
    }

    /// place a stone: merge friendly neighbor groups (xor-ing their
    /// component hashes), reflood the merged group's liberties, take
    /// one liberty from each distinct enemy neighbor group and clear
    /// the ones that die, then fold the net change into the running
    /// hash and record it in the path history.
    fn place(&mut self, cell: usize, piece: Piece) {
        debug_assert!(self.board[cell] == Piece::Empty);
        self.board[cell] = piece;
        let mut component = constant(cell, piece);
        for neighbor in neighbors(cell) {
            if self.board[neighbor] == piece && !self.dsu.joined(neighbor, cell) {
                component ^= self.component_of(neighbor);
                self.dsu.join(neighbor, cell);
            }
        }
        let representative = self.dsu.find(cell);
        self.components[representative] = component;
        self.liberties[representative] = self.flood_liberties(cell);
        let mut update = constant(cell, piece);
        let mut adjacent = Vec::with_capacity(4);
        for neighbor in neighbors(cell) {
            if self.board[neighbor] == piece.other() {
                let group = self.dsu.find(neighbor);
                if adjacent.contains(&group) {
                    continue;
                }
                adjacent.push(group);
                self.liberties[group] -= 1;
                if self.liberties[group] == 0 {
                    update ^= self.components[group];
                    self.clear(group, piece.other());
                }
            }
        }
        self.hash ^= update;
        debug_assert!(!self.seen.contains(&self.hash));
        self.seen.insert(self.hash);
    }

    /// legality of a placement, without mutating anything: the cell
    /// must be empty, the stone must end up with a liberty (an empty
    /// neighbor, a friendly neighbor group keeping one, or a capture),
    /// and the resulting whole-board hash must be unseen on the path.
    fn legal(&self, cell: usize, piece: Piece) -> bool {
        if self.board[cell] != Piece::Empty {
            return false;
        }
        let mut hash = self.hash ^ constant(cell, piece);
        let mut breathes = false;
        let mut adjacent = Vec::with_capacity(4);
        for neighbor in neighbors(cell) {
            if self.board[neighbor] == Piece::Empty {
                breathes = true;
            } else if self.board[neighbor] == piece {
                if self.liberties_of(neighbor) > 1 {
                    breathes = true;
                }
            } else if self.liberties_of(neighbor) == 1 {
                breathes = true;
                let group = self.dsu.find(neighbor);
                if !adjacent.contains(&group) {
                    adjacent.push(group);
                    hash ^= self.components[group];
                }
            }
        }
        breathes && !self.seen.contains(&hash)
    }

    fn compute_mask(&self) -> Mask {
        let piece = Piece::from(self.player);
        let mut mask = (0..GO_CELLS)
            .map(|cell| self.legal(cell, piece))
            .collect::<Mask>();
        mask.push(true);
        mask
    }

    /// tromp-taylor territory: stones count one point each, and a
    /// maximal empty region counts for a color iff no path of empty
    /// cells reaches a stone of the other color
    fn territory(&self) -> (usize, usize) {
        let mut visited = vec![false; GO_CELLS];
        let mut points = (0, 0);
        for cell in 0..GO_CELLS {
            match self.board[cell] {
                Piece::Zero => {
                    points.0 += 1;
                    continue;
                }
                Piece::One => {
                    points.1 += 1;
                    continue;
                }
                Piece::Empty => {}
            }
            if visited[cell] {
                continue;
            }
            let mut queue = VecDeque::from([cell]);
            visited[cell] = true;
            let mut count = 0;
            let mut possible = (true, true);
            while let Some(current) = queue.pop_front() {
                count += 1;
                for neighbor in neighbors(current) {
                    match self.board[neighbor] {
                        Piece::Zero => possible.1 = false,
                        Piece::One => possible.0 = false,
                        Piece::Empty => {
                            if !visited[neighbor] {
                                visited[neighbor] = true;
                                queue.push_back(neighbor);
                            }
                        }
                    }
                }
            }
            if possible.0 && !possible.1 {
                points.0 += count;
            }
            if possible.1 && !possible.0 {
                points.1 += count;
            }
        }
        points
    }
}

impl Game for Go {
    const ROWS: usize = GO_WIDTH;
    const COLS: usize = GO_WIDTH;
    const CELLS: usize = GO_CELLS;
    const ACTIONS: usize = GO_ACTIONS;
    const HISTORY: usize = GO_HISTORY;

    fn root() -> Self {
        let board = vec![Piece::Empty; GO_CELLS];
        Self {
            recent: VecDeque::from([board.clone()]),
            board,
            player: Player::Zero,
            winner: Player::None,
            over: false,
            mask: vec![true; GO_ACTIONS],
            last: None,
            depth: 0,
            hash: 0,
            seen: HashSet::from([0]),
            dsu: Dsu::new(GO_CELLS),
            liberties: vec![0; GO_CELLS],
            components: vec![0; GO_CELLS],
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
        let mut next = self.clone();
        if action != GO_PASS {
            next.place(action, Piece::from(self.player));
        }
        next.last = Some(action);
        next.depth = self.depth + 1;
        next.player = self.player.other();
        next.recent.push_front(next.board.clone());
        next.recent.truncate(GO_HISTORY);
        next.over = (self.last == Some(GO_PASS) && action == GO_PASS)
            || next.depth >= <Self as Game>::PLIES;
        if next.over {
            let (zeros, ones) = next.territory();
            let score = (zeros as Value, ones as Value + GO_KOMI);
            next.winner = if score.0 > score.1 {
                Player::Zero
            } else if score.1 > score.0 {
                Player::One
            } else {
                Player::None
            };
            next.mask = vec![false; GO_ACTIONS];
        } else {
            next.winner = Player::None;
            next.mask = next.compute_mask();
        }
        next
    }

    fn rewards(&self) -> (Value, Value) {
        match self.winner {
            Player::Zero => (1.0, -1.0),
            Player::One => (-1.0, 1.0),
            Player::None => (0.0, 0.0),
        }
    }

    fn history(&self) -> History {
        History::new(self.recent.iter().cloned().collect(), self.player)
    }
}

impl std::fmt::Display for Go {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in 0..GO_WIDTH {
            for col in 0..GO_WIDTH {
                write!(f, "{} ", self.board[row * GO_WIDTH + col].glyph())?;
            }
            writeln!(f)?;
        }
        writeln!(f, "to move: {} depth: {}", self.player, self.depth)
    }
}
