pub mod uniform;

use crate::Probability;
use crate::Value;
use crate::game::history::History;

/// the batch policy/value oracle guiding the search. the core never
/// constructs models; it holds one of these and calls it with the
/// leaves it collected. the returned policy should concentrate its
/// mass on legal actions and the value estimates reward in [-1, 1]
/// from the perspective of the side to move; the tree masks and
/// renormalizes policies regardless, and degrades non-finite outputs
/// rather than absorbing them.
pub trait Network {
    fn evaluate(&mut self, batch: &[History]) -> Vec<(Vec<Probability>, Value)>;
}
