use super::options::IterationOptions;
use crate::Action;
use crate::Probability;
use crate::Value;
use crate::game::game::Game;
use crate::game::history::History;
use crate::network::Network;
use crate::random::sample_cdf;
use crate::search::options::TreeOptions;
use crate::search::tree::Tree;
use crate::symmetry::symmetrizer::Symmetrizer;
use rand::Rng;
use rand::rngs::SmallRng;

/// one training example, emitted before the game's outcome is known.
/// the value target is assigned at collation time from the episode
/// outcome and the recorded side to move.
pub struct Record {
    pub history: History,
    pub dist: Vec<Probability>,
}

/// the training data of one completed game of self-play, plus the
/// outcome from Player::Zero's perspective
pub struct Episode {
    pub records: Vec<Record>,
    pub outcome: Value,
}

/// temperature-adjust a visit vector into a move distribution:
/// normalize, raise to the inverse-temperature exponent, and
/// renormalize. zero-visit actions keep exactly zero mass.
fn sharpen(visits: &[u32], exponent: f32) -> Vec<Probability> {
    let total = visits.iter().sum::<u32>() as Probability;
    debug_assert!(total > 0.0);
    let mut dist = visits
        .iter()
        .map(|&n| (n as Probability / total).powf(exponent))
        .collect::<Vec<Probability>>();
    let mass = dist.iter().sum::<Probability>();
    dist.iter_mut().for_each(|p| *p /= mass);
    dist
}

impl Episode {
    /// play one game: search, record the temperature-adjusted visit
    /// distribution (augmented over the symmetry group if configured),
    /// sample a move, reroot, repeat until the game ends or the ply
    /// bound cuts it short
    pub fn play<G: Game, S: Symmetrizer>(
        options: &IterationOptions,
        tree_options: TreeOptions,
        network: &mut dyn Network,
        symmetrizer: &S,
        rng: &mut SmallRng,
    ) -> Self {
        let mut tree = Tree::new(G::root(), tree_options);
        let mut records = Vec::new();
        let mut plies = 0;
        while !tree.root_game().over() && plies < G::PLIES {
            let budget = match options.fast_playout_prob > 0.0
                && rng.random::<f32>() < options.fast_playout_prob
            {
                true => (options.uct_traversals as f32 * options.fast_playout_factor) as usize,
                false => options.uct_traversals,
            }
            .max(1);
            tree.search(
                budget,
                options.max_batch_size,
                options.max_queue_size,
                network,
                symmetrizer,
                rng,
            );
            let exponent = if plies < options.early_game_cutoff {
                options.early_game_exp
            } else {
                options.rest_game_exp
            };
            let dist = sharpen(&tree.root_visits(), exponent);
            let history = tree.root_game().history();
            if options.symmetrize_data {
                let group = symmetrizer.all();
                let histories = symmetrizer.apply_state(&history, &group);
                let dists = symmetrizer.apply_dist(&dist, &group);
                records.extend(
                    histories
                        .into_iter()
                        .zip(dists)
                        .map(|(history, dist)| Record { history, dist }),
                );
            } else {
                records.push(Record {
                    history,
                    dist: dist.clone(),
                });
            }
            tree.reroot(sample(&dist, rng));
            plies += 1;
        }
        Episode {
            records,
            outcome: tree.root_game().rewards().0,
        }
    }
}

/// sample an action from the move distribution through its CDF;
/// zero-mass actions are never selected
fn sample(dist: &[Probability], rng: &mut SmallRng) -> Action {
    let mut cdf = dist.to_vec();
    for index in 1..cdf.len() {
        cdf[index] += cdf[index - 1];
    }
    sample_cdf(&cdf, rng)
}
