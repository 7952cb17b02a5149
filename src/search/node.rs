use super::options::InitQ;
use super::options::NodeOptions;
use crate::Action;
use crate::Probability;
use crate::Value;
use crate::game::game::Game;

/// one slot of the search arena: a game position wrapped with PUCT
/// edge statistics. the parallel prior/value/visit arrays are indexed
/// by action and store each edge from this node's side-to-move
/// perspective; child links materialize lazily on first selection.
///
/// lifecycle: created unexpanded; the first network evaluation caches
/// the policy and value, writes masked priors, and marks the node
/// expanded; thereafter backups mutate the visit and value arrays.
pub struct Node<G: Game> {
    pub(crate) game: G,
    pub(crate) parent: Option<usize>,
    /// action taken into this node, 0 at the root
    pub(crate) action: Action,
    pub(crate) children: Vec<Option<usize>>,
    pub(crate) priors: Vec<Probability>,
    pub(crate) values: Vec<Value>,
    pub(crate) visits: Vec<u32>,
    pub(crate) expanded: bool,
    pub(crate) evaluated: bool,
    /// cached network outputs from the first evaluation
    pub(crate) policy: Vec<Probability>,
    pub(crate) value: Value,
    /// outstanding virtual-loss reservations while queued for
    /// evaluation; zero whenever the pending queue is empty
    pub(crate) reservations: u32,
}

impl<G: Game> Node<G> {
    pub fn new(game: G, parent: Option<usize>, action: Action) -> Self {
        Self {
            game,
            parent,
            action,
            children: vec![None; G::ACTIONS],
            priors: vec![0.0; G::ACTIONS],
            values: vec![0.0; G::ACTIONS],
            visits: vec![0; G::ACTIONS],
            expanded: false,
            evaluated: false,
            policy: Vec::new(),
            value: 0.0,
            reservations: 0,
        }
    }

    /// mean action value of an edge. unvisited edges score by the
    /// configured initialization; visited edges divide accumulated
    /// value by N + 1, or by N under takeTrueQAvg.
    fn quality(&self, action: Action, options: &NodeOptions) -> Value {
        let visits = self.visits[action];
        if visits == 0 {
            match options.init_q_method {
                InitQ::Zero => 0.0,
                InitQ::ParentNnEval => self.value,
                InitQ::ParentLiveQ => {
                    let visited = self.visits.iter().sum::<u32>();
                    self.values.iter().sum::<Value>() / (1 + visited) as Value
                }
            }
        } else if options.take_true_q_avg {
            self.values[action] / visits as Value
        } else {
            self.values[action] / (1 + visits) as Value
        }
    }

    /// PUCT selection over legal actions:
    ///   score(a) = Q(a) + uWeight * P(a) * sqrt(sum N) / (1 + N(a))
    /// ties break toward the lowest action index.
    pub fn select(&self, options: &NodeOptions) -> Action {
        debug_assert!(self.expanded && self.evaluated && !self.game.over());
        let total = self.visits.iter().sum::<u32>() as Value;
        let mut best: Option<(Action, Value)> = None;
        for (action, &legal) in self.game.mask().iter().enumerate() {
            if !legal {
                continue;
            }
            let exploit = self.quality(action, options);
            let explore = self.priors[action] * total.sqrt() / (1 + self.visits[action]) as Value;
            let score = exploit + options.u_weight * explore;
            if best.is_none_or(|(_, high)| score > high) {
                best = Some((action, score));
            }
        }
        best.expect("non-terminal nodes have a legal action").0
    }
}
