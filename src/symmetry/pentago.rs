use super::d4::INVERSES;
use super::d4::transform;
use super::symmetrizer::Symmetrizer;
use crate::Probability;
use crate::Symmetry;
use crate::game::history::History;
use crate::game::pentago::PTG_ACTIONS;
use crate::game::pentago::PTG_WIDTH;
use crate::game::pentago::decode;
use crate::game::pentago::encode;

/// how the quadrants permute under each rotation, in the quadrant
/// numbering 0 1 / 2 3
const QUAD_CW: [usize; 4] = [1, 3, 0, 2];
const QUAD_HALF: [usize; 4] = [3, 2, 1, 0];
const QUAD_CCW: [usize; 4] = [2, 0, 3, 1];
const QUAD_MIRROR: [usize; 4] = [1, 0, 3, 2];

/// the dihedral group acting on pentago. boards transform like any
/// square grid; actions are (direction, quadrant, cell) triples, so
/// the quadrant follows the quadrant permutation, the cell follows
/// the grid map, and reflections swap the sense of rotation.
pub struct PentagoD4;

fn turned(action: usize, symmetry: Symmetry) -> usize {
    let (direction, quadrant, cell) = decode(action);
    if symmetry >= 4 {
        // reflect across the vertical axis first, then rotate
        let (row, col) = transform(PTG_WIDTH, 4, cell / PTG_WIDTH, cell % PTG_WIDTH);
        let reflected = encode(
            1 - direction,
            QUAD_MIRROR[quadrant],
            row * PTG_WIDTH + col,
        );
        return turned(reflected, symmetry - 4);
    }
    let quads = match symmetry {
        0 => return action,
        1 => QUAD_CW,
        2 => QUAD_HALF,
        3 => QUAD_CCW,
        _ => unreachable!("rotations are 0..4"),
    };
    let (row, col) = transform(PTG_WIDTH, symmetry, cell / PTG_WIDTH, cell % PTG_WIDTH);
    encode(direction, quads[quadrant], row * PTG_WIDTH + col)
}

impl Symmetrizer for PentagoD4 {
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
                        for row in 0..PTG_WIDTH {
                            for col in 0..PTG_WIDTH {
                                let (to_row, to_col) = transform(PTG_WIDTH, symmetry, row, col);
                                transformed[to_row * PTG_WIDTH + to_col] =
                                    board[row * PTG_WIDTH + col];
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
        debug_assert!(dist.len() == PTG_ACTIONS);
        symmetries
            .iter()
            .map(|&symmetry| {
                let mut transformed = vec![0.0; PTG_ACTIONS];
                for action in 0..PTG_ACTIONS {
                    transformed[turned(action, symmetry)] = dist[action];
                }
                transformed
            })
            .collect()
    }
}
