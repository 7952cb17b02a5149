use super::episode::Episode;
use super::episode::Record;
use super::options::WorkerOptions;
use crate::MODEL_GRACE_SECS;
use crate::MODEL_LOAD_RETRIES;
use crate::MODEL_POLL_SECS;
use crate::Value;
use crate::game::game::Game;
use crate::game::player::Player;
use crate::network::Network;
use crate::network::uniform::Uniform;
use crate::save::npy::Npy;
use crate::search::options::TreeOptions;
use crate::symmetry::symmetrizer::Symmetrizer;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::Path;
use std::path::PathBuf;

/// a model loader capability: turns a traced-model file into an
/// evaluator. loading the tensor graph itself is external to this
/// crate; the worker only decides when a file is ready to load.
pub type Loader = Box<dyn FnMut(&Path) -> anyhow::Result<Box<dyn Network>>>;

/// the per-process iteration runner: waits for each newer model,
/// plays a batch of games against itself, collates the training
/// triples, and dumps them as arrays keyed by iteration. iterations
/// are independent; the tree is rebuilt per game.
pub struct Worker<S: Symmetrizer> {
    options: WorkerOptions,
    tree_options: TreeOptions,
    symmetrizer: S,
    loader: Loader,
    directory: PathBuf,
    rng: SmallRng,
}

impl<S: Symmetrizer> Worker<S> {
    pub fn new(
        options: WorkerOptions,
        tree_options: TreeOptions,
        symmetrizer: S,
        loader: Loader,
        directory: PathBuf,
        seed: u64,
    ) -> Self {
        Self {
            options,
            tree_options,
            symmetrizer,
            loader,
            directory,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn run<G: Game>(&mut self) -> anyhow::Result<()> {
        for iteration in 0..self.options.num_iters {
            log::info!("starting iteration {}", iteration);
            let mut network = self.network::<G>(iteration);
            let block = self.options.iteration(iteration).clone();
            let mut records: Vec<Record> = Vec::new();
            let mut outcomes: Vec<Value> = Vec::new();
            let progress = crate::progress(block.num_games_per_worker);
            for game in 0..block.num_games_per_worker {
                let episode = Episode::play::<G, S>(
                    &block,
                    self.tree_options,
                    network.as_mut(),
                    &self.symmetrizer,
                    &mut self.rng,
                );
                for record in episode.records {
                    outcomes.push(match record.history.player() {
                        Player::Zero => episode.outcome,
                        _ => -episode.outcome,
                    });
                    records.push(record);
                }
                log::debug!("{} games played, {} examples collected", game + 1, records.len());
                progress.inc(1);
            }
            progress.finish_and_clear();
            log::info!("iteration {} collected {} examples", iteration, records.len());
            if let Err(error) = self.save::<G>(iteration, &records, &outcomes) {
                log::error!("skipping artifacts for iteration {}: {:#}", iteration, error);
            }
        }
        Ok(())
    }

    /// the evaluator for an iteration: the seed evaluator for
    /// iteration zero, otherwise the traced model the training loop
    /// published for the previous iteration. a model that keeps
    /// failing to load degrades to the seed evaluator rather than
    /// stalling the run.
    fn network<G: Game>(&mut self, iteration: usize) -> Box<dyn Network> {
        if iteration == 0 {
            log::info!("using the seed evaluator");
            return Box::new(Uniform::new(G::ACTIONS));
        }
        let path = self.await_model(iteration - 1);
        for attempt in 1..=MODEL_LOAD_RETRIES {
            match (self.loader)(&path) {
                Ok(network) => {
                    log::info!("using traced model {}", path.display());
                    return network;
                }
                Err(error) => {
                    log::warn!(
                        "loading {} failed on attempt {}: {:#}",
                        path.display(),
                        attempt,
                        error
                    );
                    std::thread::sleep(std::time::Duration::from_secs(MODEL_POLL_SECS));
                }
            }
        }
        log::warn!("model keeps failing to load; falling back to the seed evaluator");
        Box::new(Uniform::new(G::ACTIONS))
    }

    /// block until the traced model for an iteration appears on the
    /// shared filesystem, then give its writer a moment to finish
    fn await_model(&self, iteration: usize) -> PathBuf {
        let run = self.options.run();
        let path = PathBuf::from(format!(
            "data/models/{}/traced_{}_iteration_{}.pt",
            run, run, iteration
        ));
        while !path.exists() {
            log::info!("waiting for traced model from iteration {}", iteration);
            std::thread::sleep(std::time::Duration::from_secs(MODEL_POLL_SECS));
        }
        std::thread::sleep(std::time::Duration::from_secs(MODEL_GRACE_SECS));
        path
    }

    /// dump the iteration's three artifacts:
    ///   {run}_iteration_{k}_states.npy         [M, 2H + 1, R, C]
    ///   {run}_iteration_{k}_distributions.npy  [M, A]
    ///   {run}_iteration_{k}_outcomes.npy       [M]
    fn save<G: Game>(
        &self,
        iteration: usize,
        records: &[Record],
        outcomes: &[Value],
    ) -> anyhow::Result<()> {
        debug_assert!(records.len() == outcomes.len());
        let prefix = format!("{}_iteration_{}", self.options.run(), iteration);
        let states = records
            .iter()
            .flat_map(|record| record.history.planes(G::CELLS, G::HISTORY))
            .collect::<Vec<f32>>();
        Npy::new(
            vec![records.len(), 2 * G::HISTORY + 1, G::ROWS, G::COLS],
            states,
        )
        .save(&self.directory.join(format!("{}_states.npy", prefix)))?;
        let dists = records
            .iter()
            .flat_map(|record| record.dist.iter().copied())
            .collect::<Vec<f32>>();
        Npy::new(vec![records.len(), G::ACTIONS], dists)
            .save(&self.directory.join(format!("{}_distributions.npy", prefix)))?;
        Npy::new(vec![outcomes.len()], outcomes.to_vec())
            .save(&self.directory.join(format!("{}_outcomes.npy", prefix)))?;
        Ok(())
    }
}
