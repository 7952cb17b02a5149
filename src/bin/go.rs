use anyhow::Context;
use clap::Parser;
use gridzero::game::game::Game;
use gridzero::game::go::Go;
use gridzero::network::Network;
use gridzero::search::options::TreeOptions;
use gridzero::selfplay::options::WorkerOptions;
use gridzero::selfplay::worker::Loader;
use gridzero::selfplay::worker::Worker;
use gridzero::symmetry::d4::D4;
use std::path::Path;
use std::path::PathBuf;

/// self-play data generation worker for 7x7 go
#[derive(Parser)]
struct Args {
    /// index of this worker among the cluster's tasks
    task_id: usize,
    /// total number of worker tasks in the cluster
    num_tasks: usize,
    /// UCT options file
    #[arg(long, default_value = "config/uct.json")]
    uct_config: PathBuf,
    /// self-play options file
    #[arg(long, default_value = "config/selfplay.json")]
    selfplay_config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    gridzero::init();
    let tree_options = TreeOptions::load(&args.uct_config)?;
    let options = WorkerOptions::load(&args.selfplay_config)?;
    anyhow::ensure!(
        args.num_tasks == options.num_worker_tasks,
        "num_tasks ({}) must match numWorkerTasks ({})",
        args.num_tasks,
        options.num_worker_tasks
    );
    let group = args.task_id / (options.num_worker_tasks / options.num_groups);
    log::info!("task {} of {}, in group {}", args.task_id, args.num_tasks, group);
    let directory = PathBuf::from(format!(
        "data/games/{}/{}/{}",
        options.run(),
        group,
        args.task_id
    ));
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("create output directory {}", directory.display()))?;
    // traced models are evaluated by an external engine; without one
    // wired in, the worker degrades to the seed evaluator
    let loader: Loader = Box::new(|path: &Path| -> anyhow::Result<Box<dyn Network>> {
        anyhow::bail!("no traced-model evaluator wired in for {}", path.display())
    });
    let seed = args.task_id as u64;
    Worker::new(
        options,
        tree_options,
        D4::new(Go::COLS),
        loader,
        directory,
        seed,
    )
    .run::<Go>()
}
