pub mod game;
pub mod network;
pub mod random;
pub mod save;
pub mod search;
pub mod selfplay;
pub mod symmetry;

/// dimensional analysis types
pub type Value = f32;
pub type Probability = f32;
pub type Action = usize;
pub type Symmetry = usize;

/// legal-action indicator over the action space
pub type Mask = Vec<bool>;

// go parameters
pub const GO_KOMI: Value = 9.0;

// search parameters
pub const VIRTUAL_LOSS: Value = 1.0;

// zobrist table seed, fixed so hashes agree across workers of a run
pub const ZOBRIST_SEED: u64 = 0x5EED_0B57_ACE5_0000;

// model file polling parameters
pub const MODEL_POLL_SECS: u64 = 30;
pub const MODEL_GRACE_SECS: u64 = 5;
pub const MODEL_LOAD_RETRIES: usize = 3;

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(60);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).expect("valid template");
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize logging
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
