use super::Network;
use crate::Probability;
use crate::Value;
use crate::game::history::History;

/// the seed evaluator: a flat prior over the whole action space and
/// a neutral value. iteration zero searches with this before any
/// model exists, and workers fall back to it when a model refuses
/// to load. masking inside the tree turns the flat prior into a
/// uniform distribution over legal actions.
pub struct Uniform {
    actions: usize,
}

impl Uniform {
    pub fn new(actions: usize) -> Self {
        Self { actions }
    }
}

impl Network for Uniform {
    fn evaluate(&mut self, batch: &[History]) -> Vec<(Vec<Probability>, Value)> {
        let flat = vec![1.0 / self.actions as Probability; self.actions];
        batch.iter().map(|_| (flat.clone(), 0.0)).collect()
    }
}
