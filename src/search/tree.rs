use super::node::Node;
use super::options::TreeOptions;
use crate::Action;
use crate::Probability;
use crate::Symmetry;
use crate::VIRTUAL_LOSS;
use crate::Value;
use crate::game::game::Game;
use crate::game::player::Player;
use crate::network::Network;
use crate::random::dirichlet;
use crate::symmetry::symmetrizer::Symmetrizer;
use rand::Rng;
use rand::rngs::SmallRng;

/// outcome of one virtual traversal
enum Descent {
    /// reached a terminal node and backed its reward up immediately
    Terminal,
    /// reserved a new leaf and queued it for evaluation
    Fresh,
    /// re-reserved a leaf that is already queued; the batch should
    /// flush, since more descents cannot produce new work
    Duplicate,
}

/// the PUCT tree over one game. nodes live in a flat arena with
/// index links; slot 0 is always the root. the tree amortizes
/// network calls by descending with virtual loss until a batch of
/// distinct leaves is queued, then evaluating them in one call and
/// backing the results up.
pub struct Tree<G: Game> {
    arena: Vec<Node<G>>,
    options: TreeOptions,
    pending: Vec<usize>,
    degraded: usize,
}

impl<G: Game> Tree<G> {
    pub fn new(root: G, options: TreeOptions) -> Self {
        Self {
            arena: vec![Node::new(root, None, 0)],
            options,
            pending: Vec::new(),
            degraded: 0,
        }
    }

    pub fn root_game(&self) -> &G {
        &self.arena[0].game
    }

    pub fn root_visits(&self) -> Vec<u32> {
        self.arena[0].visits.clone()
    }

    pub fn root_priors(&self) -> Vec<Probability> {
        self.arena[0].priors.clone()
    }

    /// how many network responses were discarded for non-finite
    /// policies or values
    pub fn degraded(&self) -> usize {
        self.degraded
    }

    /// run up to `budget` PUCT traversals, batching leaves up to
    /// `max_queue` states per network call and flushing at least
    /// every `max_batch` descents. returns with the pending queue
    /// empty. in-flight batches may push the realized traversal
    /// count past the budget by at most `max_batch - 1`.
    pub fn search<S: Symmetrizer>(
        &mut self,
        budget: usize,
        max_batch: usize,
        max_queue: usize,
        network: &mut dyn Network,
        symmetrizer: &S,
        rng: &mut SmallRng,
    ) {
        debug_assert!(self.pending.is_empty());
        debug_assert!(max_batch > 0 && max_queue > 0);
        if self.arena[0].game.over() {
            return;
        }
        // an unevaluated root (fresh tree, or a reroot onto an
        // unexplored child) is evaluated up front, outside the
        // budget, so every budgeted traversal crosses a root edge
        if !self.arena[0].expanded {
            self.reserve(0);
            self.pending.push(0);
            self.flush(network, symmetrizer, rng);
        }
        let mut traversals = 0;
        let mut descents = 0;
        while traversals < budget {
            let descent = self.descend();
            traversals += 1;
            descents += 1;
            let stuck = matches!(descent, Descent::Duplicate);
            if stuck || self.pending.len() >= max_queue || descents >= max_batch {
                self.flush(network, symmetrizer, rng);
                descents = 0;
            }
        }
        self.flush(network, symmetrizer, rng);
    }

    /// one traversal: follow PUCT selection from the root until a
    /// terminal or unexpanded node, then either back up the terminal
    /// reward or reserve the leaf for evaluation
    fn descend(&mut self) -> Descent {
        let mut current = 0;
        loop {
            if self.arena[current].game.over() {
                let game = &self.arena[current].game;
                let value = match game.turn() {
                    Player::Zero => game.rewards().0,
                    _ => game.rewards().1,
                };
                self.backup(current, value);
                return Descent::Terminal;
            }
            if !self.arena[current].expanded {
                let duplicate = self.arena[current].reservations > 0;
                self.reserve(current);
                if duplicate {
                    return Descent::Duplicate;
                }
                self.pending.push(current);
                return Descent::Fresh;
            }
            let action = self.arena[current].select(&self.options.node_options);
            current = self.child(current, action);
        }
    }

    /// child of `parent` along `action`, materialized unexpanded on
    /// first selection
    fn child(&mut self, parent: usize, action: Action) -> usize {
        debug_assert!(self.arena[parent].game.mask()[action]);
        match self.arena[parent].children[action] {
            Some(child) => child,
            None => {
                let game = self.arena[parent].game.apply(action);
                let child = self.arena.len();
                self.arena.push(Node::new(game, Some(parent), action));
                self.arena[parent].children[action] = Some(child);
                child
            }
        }
    }

    /// charge a virtual loss along the path into `leaf`: every edge
    /// stepped through gains a visit and loses VIRTUAL_LOSS of value,
    /// steering later descents in this batch toward other lines
    fn reserve(&mut self, leaf: usize) {
        self.arena[leaf].reservations += 1;
        let mut current = leaf;
        while let Some(parent) = self.arena[current].parent {
            let action = self.arena[current].action;
            self.arena[parent].visits[action] += 1;
            self.arena[parent].values[action] -= VIRTUAL_LOSS;
            current = parent;
        }
    }

    /// back a fresh value up from `node` to the root, flipping sign
    /// at each step since edges store value from their parent's
    /// side-to-move perspective
    fn backup(&mut self, node: usize, value: Value) {
        let mut signed = -value;
        let mut current = node;
        while let Some(parent) = self.arena[current].parent {
            let action = self.arena[current].action;
            self.arena[parent].visits[action] += 1;
            self.arena[parent].values[action] += signed;
            signed = -signed;
            current = parent;
        }
    }

    /// settle every reservation on `leaf` with the evaluated value:
    /// each one returns the virtual loss it charged and contributes
    /// one sign-alternating backup along the (unique) path to the
    /// root. visits were already counted at reservation time.
    fn resolve(&mut self, leaf: usize, value: Value) {
        let held = self.arena[leaf].reservations as Value;
        self.arena[leaf].reservations = 0;
        let mut signed = -value;
        let mut current = leaf;
        while let Some(parent) = self.arena[current].parent {
            let action = self.arena[current].action;
            self.arena[parent].values[action] += held * (VIRTUAL_LOSS + signed);
            signed = -signed;
            current = parent;
        }
    }

    /// evaluate the queued leaves in one network call and absorb the
    /// results: undo each leaf's random symmetry on the returned
    /// priors, mask and renormalize, mix root noise on the root's
    /// first evaluation, expand, and settle the reservations
    fn flush<S: Symmetrizer>(
        &mut self,
        network: &mut dyn Network,
        symmetrizer: &S,
        rng: &mut SmallRng,
    ) {
        if self.pending.is_empty() {
            return;
        }
        let symmetries = self
            .pending
            .iter()
            .map(|_| match self.options.symmetrize_state {
                true => rng.random_range(0..symmetrizer.count()),
                false => 0,
            })
            .collect::<Vec<Symmetry>>();
        let batch = self
            .pending
            .iter()
            .zip(symmetries.iter())
            .map(|(&leaf, &symmetry)| {
                let history = self.arena[leaf].game.history();
                symmetrizer
                    .apply_state(&history, &[symmetry])
                    .pop()
                    .expect("one history per symmetry")
            })
            .collect::<Vec<_>>();
        let results = network.evaluate(&batch);
        debug_assert!(results.len() == batch.len());
        let pending = std::mem::take(&mut self.pending);
        for ((leaf, symmetry), (policy, value)) in
            pending.into_iter().zip(symmetries).zip(results)
        {
            let policy = match symmetry {
                0 => policy,
                g => symmetrizer
                    .apply_dist(&policy, &[symmetrizer.inverse(g)])
                    .pop()
                    .expect("one dist per symmetry"),
            };
            let (policy, value) = self.sanitize(leaf, policy, value);
            let priors = self.renormalize(leaf, &policy);
            let node = &mut self.arena[leaf];
            node.policy = policy;
            node.value = value;
            node.evaluated = true;
            node.expanded = true;
            node.priors = priors;
            if leaf == 0 && self.options.add_noise {
                self.perturb(rng);
            }
            self.resolve(leaf, value);
        }
    }

    /// a non-finite network response must not poison the tree: fall
    /// back to a flat policy and a neutral value and count the event
    fn sanitize(
        &mut self,
        leaf: usize,
        policy: Vec<Probability>,
        value: Value,
    ) -> (Vec<Probability>, Value) {
        if value.is_finite() && policy.iter().all(|p| p.is_finite()) {
            (policy, value)
        } else {
            log::warn!("discarding non-finite network output for node {}", leaf);
            self.degraded += 1;
            (vec![1.0; self.arena[leaf].game.mask().len()], 0.0)
        }
    }

    /// mask the policy to legal actions and renormalize; an all-zero
    /// masked policy falls back to uniform over legal actions
    fn renormalize(&self, leaf: usize, policy: &[Probability]) -> Vec<Probability> {
        let mask = self.arena[leaf].game.mask();
        debug_assert!(policy.len() == mask.len());
        let mut priors = policy
            .iter()
            .zip(mask.iter())
            .map(|(&p, &legal)| if legal { p.max(0.0) } else { 0.0 })
            .collect::<Vec<Probability>>();
        let total = priors.iter().sum::<Probability>();
        if total > 0.0 {
            priors.iter_mut().for_each(|p| *p /= total);
        } else {
            let legal = mask.iter().filter(|&&l| l).count();
            priors = mask
                .iter()
                .map(|&l| if l { 1.0 / legal as Probability } else { 0.0 })
                .collect();
        }
        priors
    }

    /// mix dirichlet noise into the root priors over legal actions:
    /// P(a) <- (1 - eps) P(a) + eps eta(a)
    fn perturb(&mut self, rng: &mut SmallRng) {
        let options = self.options.node_options;
        let mask = self.arena[0].game.mask().clone();
        let legal = mask.iter().filter(|&&l| l).count();
        let noise = dirichlet(options.dir_alpha, legal, rng);
        let mut draws = noise.into_iter();
        let node = &mut self.arena[0];
        for (action, &legal) in mask.iter().enumerate() {
            if legal {
                let eta = draws.next().expect("one draw per legal action");
                node.priors[action] = (1.0 - options.dir_eps) * node.priors[action]
                    + options.dir_eps * eta;
            }
        }
    }

    /// promote the child along `action` to be the new root, keeping
    /// its accumulated statistics and dropping every other subtree.
    /// a child that was never materialized is created unexpanded.
    pub fn reroot(&mut self, action: Action) {
        debug_assert!(self.pending.is_empty());
        let root = self.child(0, action);
        let mut order = vec![root];
        let mut remap = vec![usize::MAX; self.arena.len()];
        remap[root] = 0;
        let mut head = 0;
        while head < order.len() {
            let index = order[head];
            head += 1;
            for child in self.arena[index].children.iter().flatten() {
                remap[*child] = order.len();
                order.push(*child);
            }
        }
        let mut slots = self.arena.drain(..).map(Some).collect::<Vec<_>>();
        self.arena = order
            .iter()
            .map(|&index| {
                let mut node = slots[index].take().expect("each node promoted once");
                node.children = node
                    .children
                    .iter()
                    .map(|child| child.map(|i| remap[i]))
                    .collect();
                node.parent = node.parent.map(|p| remap[p]);
                node
            })
            .collect();
        self.arena[0].parent = None;
        self.arena[0].action = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::connectfour::ConnectFour;
    use crate::game::go::Go;
    use crate::game::history::History;
    use crate::network::uniform::Uniform;
    use crate::search::options::NodeOptions;
    use crate::symmetry::d4::D4;
    use crate::symmetry::mirror::Mirror;
    use rand::SeedableRng;

    /// fixed response for every state, for deterministic trees
    struct Stub(Vec<Probability>, Value);

    impl Network for Stub {
        fn evaluate(&mut self, batch: &[History]) -> Vec<(Vec<Probability>, Value)> {
            batch.iter().map(|_| (self.0.clone(), self.1)).collect()
        }
    }

    fn quiet() -> TreeOptions {
        TreeOptions {
            add_noise: false,
            symmetrize_state: false,
            node_options: NodeOptions::default(),
        }
    }

    #[test]
    fn budget_is_a_lower_bound_on_root_visits() {
        let mut tree = Tree::new(ConnectFour::root(), quiet());
        let mut network = Uniform::new(ConnectFour::ACTIONS);
        let mut rng = SmallRng::seed_from_u64(0);
        tree.search(25, 8, 8, &mut network, &Mirror::new(7), &mut rng);
        assert!(tree.pending.is_empty());
        assert!(tree.root_visits().iter().sum::<u32>() >= 25);
    }

    #[test]
    fn virtual_loss_leaves_no_residue() {
        // with a zero-valued network and no reachable terminals,
        // every accumulated value must return to exactly zero once
        // the queue drains
        let mut tree = Tree::new(ConnectFour::root(), quiet());
        let mut network = Stub(vec![1.0 / 7.0; 7], 0.0);
        let mut rng = SmallRng::seed_from_u64(0);
        tree.search(20, 8, 8, &mut network, &Mirror::new(7), &mut rng);
        for node in &tree.arena {
            assert!(node.reservations == 0);
            assert!(node.values.iter().all(|&w| w == 0.0));
        }
    }

    #[test]
    fn ties_break_toward_the_lowest_action() {
        let mut tree = Tree::new(ConnectFour::root(), quiet());
        let mut network = Stub(vec![1.0 / 7.0; 7], 0.0);
        let mut rng = SmallRng::seed_from_u64(0);
        // the root evaluates outside the budget; the single budgeted
        // traversal then selects the lowest of the all-tied actions
        tree.search(1, 1, 1, &mut network, &Mirror::new(7), &mut rng);
        assert!(tree.root_visits()[0] == 1);
        assert!(tree.root_visits()[1..].iter().all(|&n| n == 0));
    }

    #[test]
    fn priors_are_masked_and_renormalized() {
        // a full column must end with zero prior even though the
        // network insists on it
        let mut node = ConnectFour::root();
        for _ in 0..6 {
            node = node.apply(3);
        }
        assert!(!node.mask()[3]);
        let mut tree = Tree::new(node, quiet());
        let mut biased = vec![0.0; 7];
        biased[3] = 1.0;
        let mut network = Stub(biased, 0.0);
        let mut rng = SmallRng::seed_from_u64(0);
        tree.search(1, 1, 1, &mut network, &Mirror::new(7), &mut rng);
        let priors = tree.root_priors();
        assert!(priors[3] == 0.0);
        assert!((priors.iter().sum::<Probability>() - 1.0).abs() < 1e-6);
        // the masked policy had no mass left, so legal actions share evenly
        assert!((priors[0] - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn root_noise_keeps_a_distribution() {
        let options = TreeOptions {
            add_noise: true,
            ..quiet()
        };
        let mut tree = Tree::new(ConnectFour::root(), options);
        let mut network = Uniform::new(ConnectFour::ACTIONS);
        let mut rng = SmallRng::seed_from_u64(11);
        tree.search(1, 1, 1, &mut network, &Mirror::new(7), &mut rng);
        let priors = tree.root_priors();
        assert!((priors.iter().sum::<Probability>() - 1.0).abs() < 1e-5);
        // noise moves the priors off the uniform stub
        assert!(priors.iter().any(|&p| (p - 1.0 / 7.0).abs() > 1e-4));
    }

    #[test]
    fn non_finite_outputs_degrade_to_uniform() {
        let mut tree = Tree::new(ConnectFour::root(), quiet());
        let mut network = Stub(vec![f32::NAN; 7], f32::NAN);
        let mut rng = SmallRng::seed_from_u64(0);
        tree.search(0, 1, 1, &mut network, &Mirror::new(7), &mut rng);
        assert!(tree.degraded() == 1);
        let priors = tree.root_priors();
        assert!(priors.iter().all(|&p| (p - 1.0 / 7.0).abs() < 1e-6));
        assert!(tree.arena[0].value == 0.0);
    }

    #[test]
    fn terminal_leaves_back_up_rewards() {
        // Zero threatens on 3; a budgeted search from the winning
        // position one ply out must feed wins back to the root
        let node = [3, 0, 3, 1, 3, 6]
            .iter()
            .fold(ConnectFour::root(), |n, &a| n.apply(a));
        assert!(node.turn() == Player::Zero);
        let mut tree = Tree::new(node, quiet());
        let mut network = Uniform::new(ConnectFour::ACTIONS);
        let mut rng = SmallRng::seed_from_u64(0);
        tree.search(200, 8, 8, &mut network, &Mirror::new(7), &mut rng);
        let visits = tree.root_visits();
        let best = (0..7).max_by_key(|&a| visits[a]).expect("seven actions");
        assert!(best == 3);
    }

    #[test]
    fn reroot_preserves_child_statistics() {
        let mut tree = Tree::new(ConnectFour::root(), quiet());
        let mut network = Uniform::new(ConnectFour::ACTIONS);
        let mut rng = SmallRng::seed_from_u64(0);
        tree.search(50, 8, 8, &mut network, &Mirror::new(7), &mut rng);
        let child = tree.arena[0].children[2].expect("action 2 explored");
        let visits = tree.arena[child].visits.clone();
        let values = tree.arena[child].values.clone();
        tree.reroot(2);
        assert!(tree.arena[0].parent.is_none());
        assert!(tree.root_visits() == visits);
        assert!(tree.arena[0].values == values);
        assert!(tree.root_game().turn() == Player::One);
    }

    #[test]
    fn rerooting_onto_fresh_ground_matches_a_fresh_tree() {
        // searching after a reroot onto an unexplored child must be
        // indistinguishable from searching a brand new tree at the
        // same position, given the same seed and evaluator
        let mut network = Uniform::new(ConnectFour::ACTIONS);
        let mut rerooted = Tree::new(ConnectFour::root(), quiet());
        rerooted.reroot(5);
        let mut fresh = Tree::new(ConnectFour::root().apply(5), quiet());
        let mut rng_a = SmallRng::seed_from_u64(77);
        let mut rng_b = SmallRng::seed_from_u64(77);
        rerooted.search(40, 8, 8, &mut network, &Mirror::new(7), &mut rng_a);
        fresh.search(40, 8, 8, &mut network, &Mirror::new(7), &mut rng_b);
        assert!(rerooted.root_visits() == fresh.root_visits());
        assert!(rerooted.root_priors() == fresh.root_priors());
    }

    #[test]
    fn reroot_materializes_unexplored_children() {
        let mut tree = Tree::new(ConnectFour::root(), quiet());
        tree.reroot(5);
        assert!(tree.arena.len() == 1);
        assert!(!tree.arena[0].expanded);
        assert!(tree.root_visits().iter().all(|&n| n == 0));
    }

    #[test]
    fn symmetrized_evaluation_still_searches() {
        let options = TreeOptions {
            symmetrize_state: true,
            add_noise: false,
            node_options: NodeOptions::default(),
        };
        let mut tree = Tree::new(Go::root(), options);
        let mut network = Uniform::new(Go::ACTIONS);
        let mut rng = SmallRng::seed_from_u64(5);
        tree.search(30, 8, 8, &mut network, &D4::new(7), &mut rng);
        assert!(tree.root_visits().iter().sum::<u32>() >= 30);
        assert!(tree.pending.is_empty());
    }
}
