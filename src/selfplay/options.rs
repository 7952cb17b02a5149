use anyhow::Context;
use anyhow::ensure;
use serde::Deserialize;

/// behavior of one self-play iteration, read from the self-play
/// options file. the numeric knobs are required; the rest default.
/// unknown keys are configuration errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct IterationOptions {
    /// games each worker plays per iteration
    pub num_games_per_worker: usize,
    /// PUCT traversals per move
    pub uct_traversals: usize,
    /// traversals per batch of search
    pub max_batch_size: usize,
    /// states per network evaluation
    pub max_queue_size: usize,
    /// emit one training pair per group symmetry
    #[serde(default = "default_true")]
    pub symmetrize_data: bool,
    /// chance of a reduced-budget move, in [0, 1]
    #[serde(default)]
    pub fast_playout_prob: f32,
    /// budget multiplier for fast playouts, in [0, 1]
    #[serde(default = "default_one")]
    pub fast_playout_factor: f32,
    /// carried for configuration compatibility; the reference driver
    /// does not consume these two
    #[serde(default)]
    pub policy_target_pruning: bool,
    #[serde(default)]
    pub forced_playouts: bool,
    /// ply at which the temperature swaps from early to rest
    #[serde(default = "default_cutoff")]
    pub early_game_cutoff: usize,
    /// inverse temperature before the cutoff
    #[serde(default = "default_early")]
    pub early_game_exp: f32,
    /// inverse temperature after the cutoff
    #[serde(default = "default_rest")]
    pub rest_game_exp: f32,
}

impl IterationOptions {
    fn validate(&self, block: &str) -> anyhow::Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.fast_playout_prob),
            "{}: fastPlayoutProb must lie in [0, 1]",
            block
        );
        ensure!(
            (0.0..=1.0).contains(&self.fast_playout_factor),
            "{}: fastPlayoutFactor must lie in [0, 1]",
            block
        );
        ensure!(self.max_batch_size > 0, "{}: maxBatchSize must be positive", block);
        ensure!(self.max_queue_size > 0, "{}: maxQueueSize must be positive", block);
        Ok(())
    }
}

/// behavior of a whole worker process
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WorkerOptions {
    pub model_name: String,
    #[serde(default = "default_variant")]
    pub model_variant: String,
    /// cluster sharding: workers are split into this many groups
    pub num_groups: usize,
    pub num_worker_tasks: usize,
    pub num_iters: usize,
    /// options for iteration zero
    pub init_iteration_options: IterationOptions,
    /// options for every later iteration
    pub iteration_options: IterationOptions,
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

fn default_cutoff() -> usize {
    15
}

fn default_early() -> f32 {
    0.98
}

fn default_rest() -> f32 {
    10.0
}

fn default_variant() -> String {
    "base".to_string()
}

impl WorkerOptions {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open self-play options {}", path.display()))?;
        let options: Self = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parse self-play options {}", path.display()))?;
        options.init_iteration_options.validate("initIterationOptions")?;
        options.iteration_options.validate("iterationOptions")?;
        ensure!(options.num_groups > 0, "numGroups must be positive");
        ensure!(
            options.num_worker_tasks % options.num_groups == 0,
            "numWorkerTasks must split evenly into numGroups"
        );
        Ok(options)
    }

    /// the run name keying model files and output directories
    pub fn run(&self) -> String {
        format!("{}_{}", self.model_name, self.model_variant)
    }

    pub fn iteration(&self, iteration: usize) -> &IterationOptions {
        if iteration == 0 {
            &self.init_iteration_options
        } else {
            &self.iteration_options
        }
    }
}
