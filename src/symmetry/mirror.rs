use super::symmetrizer::Symmetrizer;
use crate::Probability;
use crate::Symmetry;
use crate::game::history::History;

/// the two-element group for games that are only symmetric across
/// the vertical axis, i.e. connect four: identity (0) and the
/// horizontal mirror (1). actions are columns, so the mirror
/// reverses the distribution.
pub struct Mirror {
    cols: usize,
}

impl Mirror {
    pub fn new(cols: usize) -> Self {
        Self { cols }
    }
}

impl Symmetrizer for Mirror {
    fn count(&self) -> usize {
        2
    }

    fn inverse(&self, symmetry: Symmetry) -> Symmetry {
        // both elements are involutions
        symmetry
    }

    fn apply_state(&self, history: &History, symmetries: &[Symmetry]) -> Vec<History> {
        symmetries
            .iter()
            .map(|&symmetry| match symmetry {
                0 => history.clone(),
                _ => {
                    let boards = history
                        .boards()
                        .iter()
                        .map(|board| {
                            let mut mirrored = board.clone();
                            for row in 0..board.len() / self.cols {
                                for col in 0..self.cols / 2 {
                                    mirrored.swap(
                                        row * self.cols + col,
                                        row * self.cols + self.cols - 1 - col,
                                    );
                                }
                            }
                            mirrored
                        })
                        .collect();
                    History::new(boards, history.player())
                }
            })
            .collect()
    }

    fn apply_dist(&self, dist: &[Probability], symmetries: &[Symmetry]) -> Vec<Vec<Probability>> {
        debug_assert!(dist.len() == self.cols);
        symmetries
            .iter()
            .map(|&symmetry| match symmetry {
                0 => dist.to_vec(),
                _ => dist.iter().rev().copied().collect(),
            })
            .collect()
    }
}
