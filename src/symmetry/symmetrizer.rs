use crate::Probability;
use crate::Symmetry;
use crate::game::history::History;

/// a group of board transformations under which the game rules are
/// invariant, acting consistently on network inputs and on action
/// distributions. training on (g . state, g . distribution) pairs is
/// what makes the learned policy equivariant.
///
/// this is a capability the search and the driver are parameterized
/// over, deliberately independent of the rules engine: for any legal
/// (state, action), applying g to both commutes with playing the
/// action.
pub trait Symmetrizer {
    /// order of the group
    fn count(&self) -> usize;

    /// the group inverse
    fn inverse(&self, symmetry: Symmetry) -> Symmetry;

    /// one transformed history per requested group element
    fn apply_state(&self, history: &History, symmetries: &[Symmetry]) -> Vec<History>;

    /// one transformed distribution per requested group element
    fn apply_dist(&self, dist: &[Probability], symmetries: &[Symmetry]) -> Vec<Vec<Probability>>;

    /// every group element, identity first
    fn all(&self) -> Vec<Symmetry> {
        (0..self.count()).collect()
    }
}
