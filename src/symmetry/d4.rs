use super::symmetrizer::Symmetrizer;
use crate::Probability;
use crate::Symmetry;
use crate::game::history::History;

/// inverse of each group element: rotations invert to the opposite
/// rotation, reflected rotations are involutions
pub const INVERSES: [Symmetry; 8] = [0, 3, 2, 1, 4, 5, 6, 7];

/// where a cell lands under a group element:
///   0 identity, 1 quarter turn clockwise, 2 half turn,
///   3 quarter turn counterclockwise, 4..7 the same after a
///   reflection across the vertical axis
pub fn transform(width: usize, symmetry: Symmetry, row: usize, col: usize) -> (usize, usize) {
    let w = width - 1;
    match symmetry {
        0 => (row, col),
        1 => (col, w - row),
        2 => (w - row, w - col),
        3 => (w - col, row),
        4 => (row, w - col),
        5 => (w - col, w - row),
        6 => (w - row, col),
        7 => (col, row),
        _ => unreachable!("dihedral group has eight elements"),
    }
}

/// the dihedral group acting on a square board whose action space is
/// one action per cell plus a trailing pass, i.e. go and othello.
/// the pass action is fixed by every group element.
pub struct D4 {
    width: usize,
}

impl D4 {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    fn cells(&self) -> usize {
        self.width * self.width
    }
}

impl Symmetrizer for D4 {
    fn count(&self) -> usize {
        8
    }

    fn inverse(&self, symmetry: Symmetry) -> Symmetry {
        INVERSES[symmetry]
    }

    fn apply_state(&self, history: &History, symmetries: &[Symmetry]) -> Vec<History> {
        symmetries
            .iter()
            .map(|&symmetry| {
                let boards = history
                    .boards()
                    .iter()
                    .map(|board| {
                        let mut transformed = board.clone();
                        for row in 0..self.width {
                            for col in 0..self.width {
                                let (to_row, to_col) = transform(self.width, symmetry, row, col);
                                transformed[to_row * self.width + to_col] =
                                    board[row * self.width + col];
                            }
                        }
                        transformed
                    })
                    .collect();
                History::new(boards, history.player())
            })
            .collect()
    }

    fn apply_dist(&self, dist: &[Probability], symmetries: &[Symmetry]) -> Vec<Vec<Probability>> {
        debug_assert!(dist.len() == self.cells() + 1);
        symmetries
            .iter()
            .map(|&symmetry| {
                let mut transformed = vec![0.0; dist.len()];
                for row in 0..self.width {
                    for col in 0..self.width {
                        let (to_row, to_col) = transform(self.width, symmetry, row, col);
                        transformed[to_row * self.width + to_col] = dist[row * self.width + col];
                    }
                }
                transformed[self.cells()] = dist[self.cells()];
                transformed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::game::Game;
    use crate::game::go::GO_WIDTH;
    use crate::game::go::Go;

    fn mapped(symmetry: Symmetry, action: usize) -> usize {
        let (row, col) = transform(GO_WIDTH, symmetry, action / GO_WIDTH, action % GO_WIDTH);
        row * GO_WIDTH + col
    }

    #[test]
    fn inverse_undoes_every_element() {
        let d4 = D4::new(GO_WIDTH);
        let node = [9, 24, 11].iter().fold(Go::root(), |n, &a| n.apply(a));
        let history = node.history();
        let mut dist = vec![0.0; GO_WIDTH * GO_WIDTH + 1];
        dist[9] = 0.5;
        dist[24] = 0.25;
        dist[GO_WIDTH * GO_WIDTH] = 0.25;
        for symmetry in d4.all() {
            let forward = d4.apply_state(&history, &[symmetry]).pop().expect("one history");
            let back = d4
                .apply_state(&forward, &[d4.inverse(symmetry)])
                .pop()
                .expect("one history");
            assert!(back == history);
            let forward = d4.apply_dist(&dist, &[symmetry]).pop().expect("one dist");
            let back = d4
                .apply_dist(&forward, &[d4.inverse(symmetry)])
                .pop()
                .expect("one dist");
            assert!(back == dist);
        }
    }

    #[test]
    fn pass_mass_is_invariant() {
        let d4 = D4::new(GO_WIDTH);
        let mut dist = vec![0.0; GO_WIDTH * GO_WIDTH + 1];
        dist[GO_WIDTH * GO_WIDTH] = 1.0;
        for out in d4.apply_dist(&dist, &d4.all()) {
            assert!(out == dist);
        }
    }

    #[test]
    fn masks_are_equivariant_along_transformed_lines() {
        // playing g-transformed moves from the symmetric empty board
        // must yield the g-transformed legal mask
        let d4 = D4::new(GO_WIDTH);
        let moves = [24, 9, 11, 39];
        for symmetry in d4.all() {
            let plain = moves.iter().fold(Go::root(), |n, &a| n.apply(a));
            let turned = moves
                .iter()
                .fold(Go::root(), |n, &a| n.apply(mapped(symmetry, a)));
            let mask = plain
                .mask()
                .iter()
                .map(|&legal| if legal { 1.0 } else { 0.0 })
                .collect::<Vec<_>>();
            let expected = d4.apply_dist(&mask, &[symmetry]).pop().expect("one dist");
            let actual = turned
                .mask()
                .iter()
                .map(|&legal| if legal { 1.0 } else { 0.0 })
                .collect::<Vec<_>>();
            assert!(actual == expected);
        }
    }
}
